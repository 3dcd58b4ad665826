/// Token usage accumulated from `response.done` events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    responses: u64,
    total_tokens: u64,
    input_tokens: u64,
    output_tokens: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responses(&self) -> u64 {
        self.responses
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }

    pub(crate) fn update_usage(&mut self, total_tokens: u64, input_tokens: u64, output_tokens: u64) {
        self.responses += 1;
        self.total_tokens += total_tokens;
        self.input_tokens += input_tokens;
        self.output_tokens += output_tokens;
    }
}
