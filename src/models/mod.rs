//! API data model: articles, sources and the closed enumerations the
//! endpoints use.
//!
//! All records are immutable values decoded from JSON. Decoding never
//! panics; malformed input yields `None` and callers treat it as "nothing".

mod article;
mod source;

pub use article::{Article, ArticleResponse, PUBLISHED_AT_FORMAT};
pub use source::{SelectedSource, Source, SourceResponse};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Declares a closed, string-backed enumeration with the API spelling,
/// a display title and the list used to build selectors.
macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($raw:literal, $title:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $raw)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in selector order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $raw,)+
                }
            }

            /// Human readable label.
            pub fn title(self) -> &'static str {
                match self {
                    $($name::$variant => $title,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($raw => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

api_enum! {
    /// `status` field of every API envelope.
    pub enum ResponseStatus {
        Ok => ("ok", "OK"),
        Error => ("error", "Error"),
    }
}

api_enum! {
    /// Article ordering offered by a source.
    pub enum SortType {
        Top => ("top", "Top"),
        Latest => ("latest", "Latest"),
        Popular => ("popular", "Popular"),
    }
}

api_enum! {
    pub enum SourceCategory {
        Business => ("business", "Business"),
        Entertainment => ("entertainment", "Entertainment"),
        Gaming => ("gaming", "Gaming"),
        General => ("general", "General"),
        Music => ("music", "Music"),
        Politics => ("politics", "Politics"),
        ScienceAndNature => ("science-and-nature", "Science and Nature"),
        Sport => ("sport", "Sport"),
        Technology => ("technology", "Technology"),
    }
}

api_enum! {
    pub enum Language {
        En => ("en", "English"),
        De => ("de", "German"),
        Fr => ("fr", "French"),
    }
}

api_enum! {
    pub enum Country {
        Au => ("au", "Australia"),
        De => ("de", "Germany"),
        Gb => ("gb", "United Kingdom"),
        In => ("in", "India"),
        It => ("it", "Italy"),
        Us => ("us", "United States"),
    }
}
