// src/bot/voices.rs - Voice catalog
//
// Fixed table of offered voices. `viraj` and `rahul` share a provider
// voice id; only the picked name decides the language tag.

/// Menu order: buttons are presented in this order, one per entry.
pub const VOICES: &[(&str, &str)] = &[
    ("rachel", "pNInz6obpgDQGcFmaJgB"),
    ("adam", "pVnrL6sighQX7hVz89cp"),
    ("alex", "GzE4TcXfh9rYCU9gVgPp"),
    ("rahul", "nPczCjzI2devNBz1zQrb"),
    ("sam", "93nuHbke4dTER9x2pDwE"),
    ("viraj", "nPczCjzI2devNBz1zQrb"),
];

/// Provider voice id for a lowercase catalog name.
pub fn voice_id(name: &str) -> Option<&'static str> {
    VOICES.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
}

/// Language tag for a chosen voice name: Hindi for `viraj`, English
/// for everything else.
pub fn language_for(name: &str) -> &'static str {
    if name == "viraj" {
        "hi"
    } else {
        "en"
    }
}

/// Button label for a catalog name, e.g. "rachel" -> "Rachel".
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// All button labels in menu order.
pub fn display_names() -> Vec<String> {
    VOICES.iter().map(|(name, _)| display_name(name)).collect()
}
