//! Tests for order filter parsing.

use std::collections::HashMap;

use uuid::Uuid;

use crate::db::{Condition, DbError, FilterValue, OrderField, OrderFilter, Predicate};

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn empty_params_yield_empty_filter() {
    let filter = OrderFilter::from_params(&HashMap::new()).unwrap();
    assert!(filter.is_empty());
}

#[test]
fn status_list_parses_as_integer_membership() {
    let filter = OrderFilter::from_params(&params(&[("status", "1,2")])).unwrap();
    assert_eq!(
        filter.conditions(),
        &[Condition {
            field: OrderField::Status,
            predicate: Predicate::In {
                values: vec![FilterValue::Int(1), FilterValue::Int(2)],
                include_null: false,
            },
        }]
    );
}

#[test]
fn null_literal_means_is_null() {
    let filter = OrderFilter::from_params(&params(&[("worker_id", "null")])).unwrap();
    assert_eq!(filter.conditions()[0].predicate, Predicate::IsNull);
}

#[test]
fn not_null_literal_means_is_not_null() {
    let filter = OrderFilter::from_params(&params(&[("worker_id", "not null")])).unwrap();
    assert_eq!(filter.conditions()[0].predicate, Predicate::IsNotNull);
}

#[test]
fn null_member_in_list_adds_null_alternative() {
    let id = "6f1c1f54-5bb8-4d4f-8d1e-0b1f9f3b6a11";
    let filter =
        OrderFilter::from_params(&params(&[("worker_id", &format!("{},null", id))])).unwrap();
    assert_eq!(
        filter.conditions()[0].predicate,
        Predicate::In {
            values: vec![FilterValue::Text(id.to_string())],
            include_null: true,
        }
    );
}

#[test]
fn text_fields_compare_as_exact_text() {
    let filter = OrderFilter::from_params(&params(&[("address", "Lenina 1")])).unwrap();
    assert_eq!(
        filter.conditions()[0].predicate,
        Predicate::Equals(FilterValue::Text("Lenina 1".to_string()))
    );
}

#[test]
fn conditions_are_sorted_by_field() {
    let filter = OrderFilter::from_params(&params(&[
        ("rate", "5"),
        ("status", "3"),
        ("user_id", "9b2f1c3e-5a4d-4e6f-8a7b-0c1d2e3f4a5b"),
    ]))
    .unwrap();
    let fields: Vec<OrderField> = filter.conditions().iter().map(|c| c.field).collect();
    assert_eq!(
        fields,
        vec![OrderField::UserId, OrderField::Status, OrderField::Rate]
    );
}

#[test]
fn malformed_status_aborts_filter() {
    let err = OrderFilter::from_params(&params(&[("status", "1,two")])).unwrap_err();
    assert!(matches!(err, DbError::Select { .. }));
}

#[test]
fn unknown_field_is_rejected() {
    let err = OrderFilter::from_params(&params(&[("status; DROP TABLE orders", "1")]))
        .unwrap_err();
    assert!(matches!(err, DbError::Select { .. }));
}

#[test]
fn id_fields_are_canonicalized() {
    let id = Uuid::new_v4();
    let upper = id.to_string().to_uppercase();
    let filter = OrderFilter::from_params(&params(&[("user_id", &upper)])).unwrap();
    assert_eq!(
        filter.conditions()[0].predicate,
        Predicate::Equals(FilterValue::Text(id.to_string()))
    );

    let err = OrderFilter::from_params(&params(&[("worker_id", "abc")])).unwrap_err();
    assert!(matches!(err, DbError::Select { .. }));
}

#[test]
fn date_fields_use_the_stored_format() {
    let filter = OrderFilter::from_params(&params(&[(
        "deadline",
        "2030-06-01T14:00:00+02:00,null",
    )]))
    .unwrap();
    assert_eq!(
        filter.conditions()[0].predicate,
        Predicate::In {
            values: vec![FilterValue::Text("2030-06-01T12:00:00.000000Z".to_string())],
            include_null: true,
        }
    );

    let err = OrderFilter::from_params(&params(&[("creation_date", "yesterday")])).unwrap_err();
    assert!(matches!(err, DbError::Select { .. }));
}
