use std::path::PathBuf;

use clap::Subcommand;
use keepsake_core::records::{PhotoDraft, PhotoFilter};
use keepsake_core::{Gateway, Store};

use super::{print_json, read_files, CliResult};

#[derive(Subcommand)]
pub enum PhotoAction {
    /// List photos, newest first
    List {
        #[arg(long)]
        album: Option<String>,
        /// Favorites only
        #[arg(long)]
        favorites: bool,
    },
    /// Upload image files into the default album
    Upload {
        files: Vec<PathBuf>,
        #[arg(long)]
        caption: Option<String>,
    },
    /// Record a photo that is already hosted
    Add {
        url: String,
        #[arg(long, default_value = "")]
        caption: String,
        #[arg(long, default_value = "default")]
        album: String,
    },
    /// Change a caption
    Caption { id: String, caption: String },
    /// Toggle favorite
    Favorite { id: String },
    /// Delete the record (the stored file is kept)
    Delete { id: String },
}

pub async fn run<G: Gateway>(action: PhotoAction, store: &Store<G>) -> CliResult {
    match action {
        PhotoAction::List { album, favorites } => {
            let filter = PhotoFilter {
                album,
                is_favorite: favorites.then_some(true),
            };
            print_json(&store.list_photos(&filter).await?)?;
        }
        PhotoAction::Upload { files, caption } => {
            let mut added = Vec::new();
            for (name, bytes) in read_files(&files)? {
                let mut photo = store.upload_photo(&name, bytes).await?;
                if let Some(caption) = &caption {
                    photo = store.update_photo_caption(&photo.id, caption).await?;
                }
                added.push(photo);
            }
            print_json(&added)?;
        }
        PhotoAction::Add {
            url,
            caption,
            album,
        } => {
            let draft = PhotoDraft {
                image_url: url,
                caption,
                album,
            };
            print_json(&store.add_photo(&draft).await?)?;
        }
        PhotoAction::Caption { id, caption } => {
            print_json(&store.update_photo_caption(&id, &caption).await?)?
        }
        PhotoAction::Favorite { id } => {
            let photo = store.get_photo(&id).await?;
            print_json(&store.toggle_photo_favorite(&photo).await?)?;
        }
        PhotoAction::Delete { id } => {
            store.delete_photo(&id).await?;
            println!("deleted {id}");
        }
    }
    Ok(())
}
