pub mod artifact;
pub mod clock;
pub mod git;
pub mod version;
