//! Catalog resource definitions.
//!
//! Each resource is one table in the catalog store with a numeric `id`
//! assigned on insert. The field schema is the only contract on its columns.

use crate::validation::{Field, FieldSchema};

#[derive(Debug)]
pub struct Resource {
    /// Table name, collection key in list responses and first path segment.
    pub collection: &'static str,
    /// Key used in HATEOAS `links` for a single record.
    pub singular: &'static str,
    pub schema: FieldSchema,
    pub messages: Messages,
}

/// Static error texts per route. Store errors are logged, never echoed.
#[derive(Debug)]
pub struct Messages {
    pub list_failed: &'static str,
    pub invalid_body: &'static str,
    pub insert_failed: &'static str,
    pub fetch_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
}

impl Resource {
    pub fn base_path(&self) -> String {
        format!("/{}", self.collection)
    }

    pub fn record_path(&self, id: impl std::fmt::Display) -> String {
        format!("/{}/{}", self.collection, id)
    }
}

pub static ALBUMS: Resource = Resource {
    collection: "albums",
    singular: "album",
    schema: FieldSchema::new(&[
        Field { name: "title", required: true },
        Field { name: "artist", required: true },
        Field { name: "genre", required: true },
        Field { name: "year", required: true },
    ]),
    messages: Messages {
        list_failed: "Error fetching albums list.  Please try again later.",
        invalid_body: "Request body is not a valid album object.",
        insert_failed: "Error inserting album into DB.  Please try again later.",
        fetch_failed: "Unable to fetch album.  Please try again later.",
        update_failed: "Unable to update specified album.  Please try again later.",
        delete_failed: "Unable to delete album.  Please try again later.",
    },
};

pub static ARTISTS: Resource = Resource {
    collection: "artists",
    singular: "artist",
    schema: FieldSchema::new(&[
        Field { name: "name", required: true },
        Field { name: "genre", required: true },
    ]),
    messages: Messages {
        list_failed: "Error fetching artists list.  Please try again later.",
        invalid_body: "Request body is not a valid artist object.",
        insert_failed: "Error inserting artist into DB.  Please try again later.",
        fetch_failed: "Unable to fetch artist.  Please try again later.",
        update_failed: "Unable to update specified artist.  Please try again later.",
        delete_failed: "Unable to delete artist.  Please try again later.",
    },
};

pub static GENRES: Resource = Resource {
    collection: "genres",
    singular: "genre",
    schema: FieldSchema::new(&[Field { name: "genre", required: true }]),
    messages: Messages {
        list_failed: "Error fetching genre list.  Please try again later.",
        invalid_body: "Request body is not a valid genre object.",
        insert_failed: "Error inserting genre into DB.  Please try again later.",
        fetch_failed: "Unable to fetch genre.  Please try again later.",
        update_failed: "Unable to update specified genre.  Please try again later.",
        delete_failed: "Unable to delete genre.  Please try again later.",
    },
};

pub static SONGS: Resource = Resource {
    collection: "songs",
    singular: "song",
    schema: FieldSchema::new(&[
        Field { name: "title", required: true },
        Field { name: "artist", required: true },
        Field { name: "album", required: true },
        Field { name: "length", required: false },
        Field { name: "track", required: false },
    ]),
    messages: Messages {
        list_failed: "Error fetching songs list.  Please try again later.",
        invalid_body: "Request body is not a valid song object.",
        insert_failed: "Error inserting song into DB.  Please try again later.",
        fetch_failed: "Unable to fetch song.  Please try again later.",
        update_failed: "Unable to update specified song.  Please try again later.",
        delete_failed: "Unable to delete song.  Please try again later.",
    },
};

pub static PLAYLISTS: Resource = Resource {
    collection: "playlists",
    singular: "playlist",
    schema: FieldSchema::new(&[
        Field { name: "name", required: true },
        Field { name: "userid", required: true },
    ]),
    messages: Messages {
        list_failed: "Error fetching playlists list.  Please try again later.",
        invalid_body: "Request body is not a valid playlist object.",
        insert_failed: "Error inserting playlist into DB.  Please try again later.",
        fetch_failed: "Unable to fetch playlist.  Please try again later.",
        update_failed: "Unable to update specified playlist.  Please try again later.",
        delete_failed: "Unable to delete playlist.  Please try again later.",
    },
};

/// Owner column on playlists, matched against the authenticated user.
pub const PLAYLIST_OWNER: &str = "userid";

/// Resources served only by the generic CRUD routes. Playlists add
/// ownership checks and are routed separately.
pub fn generic() -> [&'static Resource; 4] {
    [&ALBUMS, &ARTISTS, &GENRES, &SONGS]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_collection_name() {
        assert_eq!(ALBUMS.base_path(), "/albums");
        assert_eq!(SONGS.record_path(7), "/songs/7");
    }

    #[test]
    fn playlist_schema_carries_owner() {
        assert!(PLAYLISTS.schema.contains(PLAYLIST_OWNER));
        assert!(!PLAYLISTS.schema.contains("id"));
    }

    #[test]
    fn song_schema_marks_optional_fields() {
        let optional: Vec<_> = SONGS
            .schema
            .fields()
            .iter()
            .filter(|f| !f.required)
            .map(|f| f.name)
            .collect();
        assert_eq!(optional, vec!["length", "track"]);
    }
}
