// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_prison;
use crate::{DomainError, VisitContact, Visitor, validate_visit_contact, validate_visitors};

#[test]
fn test_valid_visitors() {
    let visitors = vec![Visitor::new(1, true), Visitor::new(2, false)];
    assert!(validate_visitors(&create_test_prison(), &visitors).is_ok());
}

#[test]
fn test_no_visitors_rejected() {
    assert!(matches!(
        validate_visitors(&create_test_prison(), &[]),
        Err(DomainError::InvalidVisitors { .. })
    ));
}

#[test]
fn test_too_many_visitors_rejected() {
    let visitors: Vec<Visitor> = (1..=4).map(|id| Visitor::new(id, false)).collect();
    assert!(validate_visitors(&create_test_prison(), &visitors).is_err());
}

#[test]
fn test_single_contact_visitor() {
    let visitors = vec![Visitor::new(1, true), Visitor::new(2, true)];
    assert!(validate_visitors(&create_test_prison(), &visitors).is_err());
}

#[test]
fn test_duplicate_visitor_rejected() {
    let visitors = vec![Visitor::new(1, false), Visitor::new(1, false)];
    assert!(validate_visitors(&create_test_prison(), &visitors).is_err());
}

#[test]
fn test_blank_contact_name_rejected() {
    let contact = VisitContact {
        name: String::from("  "),
        telephone: None,
        email: None,
    };
    assert!(validate_visit_contact(&contact).is_err());
}
