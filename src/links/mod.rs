use serde::{Deserialize, Serialize};
use url::form_urlencoded::byte_serialize;

use crate::config::Config;
use crate::wire::PlaceLink;

const MAP_SEARCH: &str = "https://www.google.com/maps/search/?api=1&query={q}";
const IMAGE_SEARCH: &str = "https://www.google.com/search?tbm=isch&q={q}";
const STATIC_MAP: &str =
    "https://maps.googleapis.com/maps/api/staticmap?center={q}&zoom=15&size=600x300&markers={q}&key={k}";

/// Appended to the place name before an image search.
pub const IMAGE_SUFFIX: &str = " 사진";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub map: PlaceLink,
    pub image: PlaceLink,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_map: Option<PlaceLink>,
}

/// Percent-encode a query value. Form encoding writes spaces as `+`; a
/// literal `+` has already become `%2B`, so every `+` left is a space.
fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect::<String>().replace('+', "%20")
}

/// Place name → map/image URLs. Pure string templating.
#[derive(Debug, Clone, Default)]
pub struct LinkAnnotator {
    maps_api_key: Option<String>,
}

impl LinkAnnotator {
    pub fn new(cfg: &Config) -> Self {
        Self { maps_api_key: cfg.maps_api_key.clone() }
    }

    pub fn map_link(&self, name: &str) -> PlaceLink {
        PlaceLink {
            name: name.to_string(),
            url: MAP_SEARCH.replace("{q}", &encode(name)),
        }
    }

    pub fn image_link(&self, name: &str) -> PlaceLink {
        let term = format!("{name}{IMAGE_SUFFIX}");
        PlaceLink {
            name: name.to_string(),
            url: IMAGE_SEARCH.replace("{q}", &encode(&term)),
        }
    }

    pub fn static_map_link(&self, name: &str) -> Option<PlaceLink> {
        let key = self.maps_api_key.as_deref()?;
        Some(PlaceLink {
            name: name.to_string(),
            url: STATIC_MAP.replace("{q}", &encode(name)).replace("{k}", &encode(key)),
        })
    }

    pub fn annotate(&self, name: &str) -> Annotation {
        Annotation {
            name: name.to_string(),
            map: self.map_link(name),
            image: self.image_link(name),
            static_map: self.static_map_link(name),
        }
    }

    pub fn annotate_all<'a, I>(&self, names: I) -> Vec<Annotation>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().map(|n| self.annotate(n)).collect()
    }
}
