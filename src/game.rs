use std::fmt;

/// A specific build of a game image that patches are generated for.
///
/// Each build has its own symbol table and its own hook layout, so everything that touches
/// addresses is keyed by this id.
#[derive(
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Clone,
    Copy,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
pub enum GameBuild {
    #[strum(serialize = "MP1_USA", ascii_case_insensitive)]
    Mp1Usa,
    #[strum(serialize = "MP2_USA", ascii_case_insensitive)]
    Mp2Usa,
    #[strum(serialize = "MP3_USA", ascii_case_insensitive)]
    Mp3Usa,
}

impl GameBuild {
    pub fn id(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for GameBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_game_build_ids() {
        for game in GameBuild::iter() {
            assert_eq!(GameBuild::from_str(game.id()), Ok(game));
        }
        assert_eq!(GameBuild::from_str("mp2_usa"), Ok(GameBuild::Mp2Usa));
        assert!(GameBuild::from_str("MP4_USA").is_err());
    }
}
