//! Easy2 Handler for a single segment: buffers the whole response body.

/// Body collected for one segment request. Written to disk only after the
/// transfer finished with status 200.
#[derive(Debug, Default)]
pub struct BodyHandler {
    body: Vec<u8>,
}

impl BodyHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }
}

impl curl::easy::Handler for BodyHandler {
    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}
