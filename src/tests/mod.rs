//! Store-level scenarios exercised through the public API.
