#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Document {
    pub id: u64,
    pub text: String,
}

impl Document {
    pub fn new(id: u64, text: String) -> Self {
        Self { id, text }
    }
}
