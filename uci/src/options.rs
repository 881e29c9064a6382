//! UCI options the engine advertises in response to `uci`.

use std::fmt::Display;

pub struct UciOption {
    pub name: &'static str,
    pub option_type: OptionType,
}

pub enum OptionType {
    Spin {
        min: i32,
        max: i32,
        default: i32,
    },

    Check {
        default: bool,
    },

    Combo {
        default: &'static str,
        choices: &'static [&'static str],
    },
}

impl Display for UciOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "name {} ", self.name)?;

        match &self.option_type {
            OptionType::Spin { min, max, default } => {
                write!(f, "type spin default {default} min {min} max {max}")
            }

            OptionType::Check { default } => {
                write!(f, "type check default {default}")
            }

            OptionType::Combo { default, choices } => {
                write!(f, "type combo default {default}")?;

                for choice in choices.iter() {
                    write!(f, " var {choice}")?;
                }

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_formatting() {
        let hash = UciOption {
            name: "Hash",
            option_type: OptionType::Spin {
                min: 4,
                max: 1024,
                default: 64,
            },
        };

        assert_eq!(hash.to_string(), "name Hash type spin default 64 min 4 max 1024");

        let variant = UciOption {
            name: "UCI_Variant",
            option_type: OptionType::Combo {
                default: "standard",
                choices: &["standard", "racingkings", "atomic", "horde"],
            },
        };

        assert_eq!(
            variant.to_string(),
            "name UCI_Variant type combo default standard \
             var standard var racingkings var atomic var horde"
        );
    }
}
