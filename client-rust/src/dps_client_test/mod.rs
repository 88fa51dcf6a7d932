mod transport;

pub use transport::{MockResponse, MockTransport};
