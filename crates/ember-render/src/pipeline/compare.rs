use std::collections::HashMap;

use lazy_static::lazy_static;

/// Comparison function for depth testing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompareMode {
    Always,
    Equal,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Never,
    NotEqual,
}

lazy_static! {
    /// Compare mode -> API token. Built once, never mutated.
    static ref DEPTH_FUNCS: HashMap<CompareMode, u32> = {
        let mut m = HashMap::new();

        m.insert(CompareMode::Always, gl::ALWAYS);
        m.insert(CompareMode::Equal, gl::EQUAL);
        m.insert(CompareMode::Greater, gl::GREATER);
        m.insert(CompareMode::GreaterEqual, gl::GEQUAL);
        m.insert(CompareMode::Less, gl::LESS);
        m.insert(CompareMode::LessEqual, gl::LEQUAL);
        m.insert(CompareMode::Never, gl::NEVER);
        m.insert(CompareMode::NotEqual, gl::NOTEQUAL);

        m
    };
}

/// Looks up the API token for a depth comparison function.
pub fn depth_func_token(mode: CompareMode) -> u32 {
    DEPTH_FUNCS[&mode]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_a_token() {
        assert_eq!(depth_func_token(CompareMode::Less), gl::LESS);
        assert_eq!(depth_func_token(CompareMode::GreaterEqual), gl::GEQUAL);
        assert_eq!(depth_func_token(CompareMode::NotEqual), gl::NOTEQUAL);
    }
}
