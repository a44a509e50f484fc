// Resume roasting: prompt building, the two-call generation pipeline, share links,
// and the HTTP handlers that tie them to extraction and the store.
// All generation calls go through llm_client.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod share;
