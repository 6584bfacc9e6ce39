//! Built-in seed set used by `reset_to_default` and first-run bootstrap.

use crate::types::{Category, Item, ItemFields, ItemId};

const CREATOR: &str = "Little Crack";
const YEAR: i32 = 2024;

const SEED: &[(&str, &str, &str, &str)] = &[
    (
        "Rabbit Cracker",
        "https://cdn.imweb.me/thumbnail/20250527/38f44f6d8209f.png",
        "/audio/rabbit.mp3",
        "A cute rabbit character",
    ),
    (
        "Bear Cracker",
        "https://cdn.imweb.me/thumbnail/20250527/9318aa38c687d.png",
        "/audio/bear.mp3",
        "A warm-hearted bear character",
    ),
    (
        "Cat Cracker",
        "https://cdn.imweb.me/thumbnail/20250527/e927347749a74.png",
        "/audio/cat.mp3",
        "A lovable cat character",
    ),
    (
        "Fox Cracker",
        "https://cdn.imweb.me/thumbnail/20250527/a5ed1506d849f.png",
        "/audio/fox.mp3",
        "A clever fox character",
    ),
    (
        "Deer Cracker",
        "https://cdn.imweb.me/thumbnail/20250527/cdb3d1e8d380a.png",
        "/audio/deer.mp3",
        "A graceful deer character",
    ),
    (
        "Penguin Cracker",
        "https://cdn.imweb.me/thumbnail/20250527/c5ea4ef8a3a7e.png",
        "/audio/penguin.mp3",
        "A charming penguin character",
    ),
];

/// The fixed seed items, ids `1..=6`, ranked in list order.
pub fn default_items() -> Vec<Item> {
    SEED.iter()
        .enumerate()
        .map(|(i, (title, cover, audio, description))| Item {
            id: ItemId(i as i64 + 1),
            fields: ItemFields {
                title: (*title).to_owned(),
                creator: CREATOR.to_owned(),
                cover_image_ref: Some((*cover).to_owned()),
                audio_ref: Some((*audio).to_owned()),
                description: Some((*description).to_owned()),
                rich_content: None,
                category: Category::default(),
                year: Some(YEAR),
            },
            display_order: i as u32 + 1,
        })
        .collect()
}
