#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandStats {
    /// Unix seconds of the first recorded invocation, if any.
    pub created_at: Option<u64>,
    pub slash_uses: u64,
    pub prefix_uses: u64,
}

impl CommandStats {
    pub fn total_uses(&self) -> u64 {
        self.slash_uses.saturating_add(self.prefix_uses)
    }
}
