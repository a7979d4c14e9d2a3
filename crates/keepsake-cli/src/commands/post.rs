use std::path::PathBuf;

use clap::Subcommand;
use keepsake_core::records::{FeedFilter, PostDraft, PostFilter, PostStatus, PostType};
use keepsake_core::{Gateway, Store};

use super::{print_json, read_files, CliResult};

#[derive(Subcommand)]
pub enum PostAction {
    /// List posts, newest first
    List {
        /// Feed tab: all, published, draft, favorite
        #[arg(long, default_value = "all")]
        feed: FeedFilter,
        /// Only this type (poem, journal, idea)
        #[arg(long = "type")]
        post_type: Option<PostType>,
    },
    /// Show one post
    Show { id: String },
    /// Write a new post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "type", default_value = "poem")]
        post_type: PostType,
        /// Publish immediately instead of saving a draft
        #[arg(long)]
        publish: bool,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Image or video files to attach
        #[arg(long = "media")]
        media: Vec<PathBuf>,
        #[arg(long)]
        featured_image: Option<String>,
    },
    /// Edit title, content, type or tags
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long = "type")]
        post_type: Option<PostType>,
        #[arg(long = "tag")]
        add_tags: Vec<String>,
        #[arg(long = "untag")]
        remove_tags: Vec<String>,
        /// Detach a media URL
        #[arg(long = "remove-media")]
        remove_media: Vec<String>,
    },
    /// Mark as published
    Publish { id: String },
    /// Move back to drafts
    Unpublish { id: String },
    /// Toggle favorite
    Favorite { id: String },
    /// Delete a post
    Delete { id: String },
}

pub async fn run<G: Gateway>(action: PostAction, store: &Store<G>) -> CliResult {
    match action {
        PostAction::List { feed, post_type } => {
            let filter = PostFilter {
                post_type,
                ..PostFilter::default()
            };
            let posts = store.list_posts(&filter).await?;
            print_json(&feed.apply(&posts))?;
        }
        PostAction::Show { id } => print_json(&store.get_post(&id).await?)?,
        PostAction::Create {
            title,
            content,
            post_type,
            publish,
            tags,
            media,
            featured_image,
        } => {
            let mut draft = PostDraft::new(title, content);
            draft.post_type = post_type;
            draft.featured_image = featured_image;
            if publish {
                draft.status = PostStatus::Published;
            }
            for tag in &tags {
                draft.add_tag(tag);
            }
            // Fail on bad input before uploading anything.
            draft.validate()?;
            let files = read_files(&media)?;
            if !files.is_empty() {
                let bucket = store.media_bucket().to_string();
                let stored = store.upload_many(&bucket, files).await?;
                draft.media_urls = stored.into_iter().map(|b| b.public_url).collect();
            }
            print_json(&store.create_post(&draft).await?)?;
        }
        PostAction::Edit {
            id,
            title,
            content,
            post_type,
            add_tags,
            remove_tags,
            remove_media,
        } => {
            let post = store.get_post(&id).await?;
            let mut draft = PostDraft::from(&post);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(content) = content {
                draft.content = content;
            }
            if let Some(post_type) = post_type {
                draft.post_type = post_type;
            }
            for tag in &remove_tags {
                draft.remove_tag(tag);
            }
            for tag in &add_tags {
                draft.add_tag(tag);
            }
            for url in &remove_media {
                draft.remove_media(url);
            }
            print_json(&store.update_post(&id, &draft).await?)?;
        }
        PostAction::Publish { id } => {
            print_json(&store.set_post_status(&id, PostStatus::Published).await?)?
        }
        PostAction::Unpublish { id } => {
            print_json(&store.set_post_status(&id, PostStatus::Draft).await?)?
        }
        PostAction::Favorite { id } => {
            let post = store.get_post(&id).await?;
            print_json(&store.toggle_post_favorite(&post).await?)?;
        }
        PostAction::Delete { id } => {
            store.delete_post(&id).await?;
            println!("deleted {id}");
        }
    }
    Ok(())
}
