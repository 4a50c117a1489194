//! Platform directory lookups routed through [`ReadEnv`].

use std::path::PathBuf;

use crate::env::ReadEnv;

/// The current user's home directory, or `None` when the variable is unset
/// or empty.
pub fn home_dir<E: ReadEnv>(env: &E) -> Option<PathBuf> {
    let var = if cfg!(target_os = "windows") {
        "USERPROFILE"
    } else {
        "HOME"
    };
    env.non_empty_var(var).map(PathBuf::from)
}

#[cfg(all(test, not(target_os = "windows")))]
mod tests {
    use super::*;
    use crate::env::InMemoryEnv;

    #[test]
    fn reads_home() {
        let env = InMemoryEnv::new();
        env.set("HOME", "/home/alice");

        assert_eq!(home_dir(&env), Some(PathBuf::from("/home/alice")));
    }

    #[test]
    fn empty_home_is_none() {
        let env = InMemoryEnv::new();
        env.set("HOME", "");

        assert_eq!(home_dir(&env), None);
    }

    #[test]
    fn missing_home_is_none() {
        assert_eq!(home_dir(&InMemoryEnv::new()), None);
    }
}
