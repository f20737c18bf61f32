pub mod time;

/// Generate a url-safe unique identifier.
pub fn longid() -> String {
    nanoid::nanoid!()
}
