use clap::Subcommand;
use keepsake_core::records::{IdeaDraft, IDEA_COLORS};
use keepsake_core::{Gateway, Store};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum IdeaAction {
    /// List ideas, pinned first
    List {
        /// Show the archive instead of active ideas
        #[arg(long)]
        archived: bool,
    },
    /// Jot down an idea
    Add {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// One of the card colors (see `idea colors`)
        #[arg(long)]
        color: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Edit an idea
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long = "tag")]
        add_tags: Vec<String>,
        #[arg(long = "untag")]
        remove_tags: Vec<String>,
    },
    /// Toggle pinned
    Pin { id: String },
    /// Toggle archived
    Archive { id: String },
    /// Delete an idea
    Delete { id: String },
    /// Card colors
    Colors,
}

fn check_color(color: &str) -> Result<(), String> {
    if IDEA_COLORS.contains(&color) {
        Ok(())
    } else {
        Err(format!("unknown color {color}; choose one of {}", IDEA_COLORS.join(", ")))
    }
}

pub async fn run<G: Gateway>(action: IdeaAction, store: &Store<G>) -> CliResult {
    match action {
        IdeaAction::List { archived } => print_json(&store.list_ideas(archived).await?)?,
        IdeaAction::Add {
            title,
            content,
            color,
            tags,
        } => {
            let mut draft = IdeaDraft::new(title);
            draft.content = content;
            if let Some(color) = color {
                check_color(&color)?;
                draft.color = color;
            }
            for tag in &tags {
                draft.add_tag(tag);
            }
            print_json(&store.create_idea(&draft).await?)?;
        }
        IdeaAction::Edit {
            id,
            title,
            content,
            color,
            add_tags,
            remove_tags,
        } => {
            let idea = store.get_idea(&id).await?;
            let mut draft = IdeaDraft::from(&idea);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(content) = content {
                draft.content = content;
            }
            if let Some(color) = color {
                check_color(&color)?;
                draft.color = color;
            }
            for tag in &remove_tags {
                draft.remove_tag(tag);
            }
            for tag in &add_tags {
                draft.add_tag(tag);
            }
            print_json(&store.update_idea(&id, &draft).await?)?;
        }
        IdeaAction::Pin { id } => {
            let idea = store.get_idea(&id).await?;
            print_json(&store.toggle_idea_pin(&idea).await?)?;
        }
        IdeaAction::Archive { id } => {
            let idea = store.get_idea(&id).await?;
            print_json(&store.toggle_idea_archive(&idea).await?)?;
        }
        IdeaAction::Delete { id } => {
            store.delete_idea(&id).await?;
            println!("deleted {id}");
        }
        IdeaAction::Colors => print_json(&IDEA_COLORS)?,
    }
    Ok(())
}
