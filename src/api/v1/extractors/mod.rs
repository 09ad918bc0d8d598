mod raw_request;

pub use raw_request::RawParams;
