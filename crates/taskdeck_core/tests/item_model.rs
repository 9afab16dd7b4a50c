use taskdeck_core::{Item, ItemId, ItemValidationError};
use uuid::Uuid;

#[test]
fn item_serialization_uses_expected_wire_fields() {
    let id = ItemId::from_uuid(Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap());
    let item = Item::with_created_at(id, "Buy milk", 1_700_000_000_000).unwrap();

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(json["text"], "Buy milk");
    assert_eq!(json["completed"], false);
    assert_eq!(json["created_at_ms"], 1_700_000_000_000_i64);

    let decoded: Item = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, item);
}

#[test]
fn deserialize_rejects_blank_text() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "text": "   ",
        "completed": true,
        "created_at_ms": 0
    });

    let err = serde_json::from_value::<Item>(value).unwrap_err();
    assert!(
        err.to_string().contains("item text must not be blank"),
        "unexpected error: {err}"
    );
}

#[test]
fn with_created_at_rejects_blank_text() {
    let err = Item::with_created_at(ItemId::new_random(), " \t ", 0).unwrap_err();
    assert_eq!(err, ItemValidationError::BlankText);
}
