use uuid::Uuid;

/// Fresh primary key for any model.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
