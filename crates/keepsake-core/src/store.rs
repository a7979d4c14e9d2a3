//! Typed record operations over an injected [`Gateway`].
//!
//! Every write goes to the gateway first and only the confirmed row comes
//! back to the caller; nothing here caches records.

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::Result;
use crate::gateway::{Entity, Gateway, Query, StoredBlob};
use crate::random::RandomSource;
use crate::records::idea::ideas_query;
use crate::records::mood::month_bounds;
use crate::records::prompt::PROMPT_POOL;
use crate::records::{
    Idea, IdeaDraft, Mood, MoodCalendar, MoodEntry, Photo, PhotoDraft, PhotoFilter, Post,
    PostDraft, PostFilter, PostStatus, WritingPrompt,
};
use crate::storage::GatewayConfig;

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_posts: usize,
    pub published_posts: usize,
    pub photos: usize,
    pub moods: usize,
    /// Non-archived ideas only.
    pub ideas: usize,
}

pub struct Store<G> {
    gateway: G,
    photo_bucket: String,
    media_bucket: String,
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn decode_all<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter().map(decode).collect()
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339()
}

/// `fields` as a JSON object with `updated_at` set to now.
fn with_updated_at(fields: impl Serialize) -> Result<Value> {
    let mut value = serde_json::to_value(fields)?;
    if let Value::Object(map) = &mut value {
        map.insert("updated_at".into(), Value::String(now_stamp()));
    }
    Ok(value)
}

impl<G: Gateway> Store<G> {
    pub fn new(gateway: G) -> Self {
        let defaults = GatewayConfig::default();
        Self {
            gateway,
            photo_bucket: defaults.photo_bucket,
            media_bucket: defaults.media_bucket,
        }
    }

    /// Use the bucket names from config.
    pub fn with_buckets(mut self, config: &GatewayConfig) -> Self {
        self.photo_bucket = config.photo_bucket.clone();
        self.media_bucket = config.media_bucket.clone();
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn media_bucket(&self) -> &str {
        &self.media_bucket
    }

    // ── Posts ────────────────────────────────────────────────────────

    pub async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        decode_all(self.gateway.list(Entity::Posts, &filter.to_query()).await?)
    }

    pub async fn get_post(&self, id: &str) -> Result<Post> {
        decode(self.gateway.get_one(Entity::Posts, id).await?)
    }

    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post> {
        draft.validate()?;
        let fields = serde_json::to_value(draft.normalized())?;
        let post: Post = decode(self.gateway.create(Entity::Posts, fields).await?)?;
        info!(id = %post.id, status = %post.status, "post created");
        Ok(post)
    }

    pub async fn update_post(&self, id: &str, draft: &PostDraft) -> Result<Post> {
        draft.validate()?;
        let fields = with_updated_at(draft.normalized())?;
        decode(self.gateway.update(Entity::Posts, id, fields).await?)
    }

    pub async fn set_post_status(&self, id: &str, status: PostStatus) -> Result<Post> {
        let fields = with_updated_at(json!({ "status": status }))?;
        decode(self.gateway.update(Entity::Posts, id, fields).await?)
    }

    pub async fn toggle_post_favorite(&self, post: &Post) -> Result<Post> {
        let fields = with_updated_at(json!({ "is_favorite": !post.is_favorite }))?;
        decode(self.gateway.update(Entity::Posts, &post.id, fields).await?)
    }

    pub async fn delete_post(&self, id: &str) -> Result<()> {
        self.gateway.delete(Entity::Posts, id).await?;
        Ok(())
    }

    // ── Media ────────────────────────────────────────────────────────

    /// Upload under `{epoch_ms}-{file_name}`; never overwrites.
    pub async fn upload_media(
        &self,
        bucket: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredBlob> {
        let path = format!("{}-{file_name}", Utc::now().timestamp_millis());
        let content_type = crate::gateway::content_type_for(file_name);
        debug!(bucket, %path, "uploading media");
        Ok(self
            .gateway
            .upload_blob(bucket, &path, bytes, content_type)
            .await?)
    }

    /// Upload each file in turn. Stops at the first failure.
    pub async fn upload_many(
        &self,
        bucket: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<Vec<StoredBlob>> {
        let mut stored = Vec::with_capacity(files.len());
        for (name, bytes) in files {
            stored.push(self.upload_media(bucket, &name, bytes).await?);
        }
        Ok(stored)
    }

    pub async fn delete_media(&self, bucket: &str, path: &str) -> Result<()> {
        self.gateway.delete_blob(bucket, path).await?;
        Ok(())
    }

    // ── Moods ────────────────────────────────────────────────────────

    /// Newest date first, optionally bounded on either side (inclusive).
    pub async fn list_moods(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Mood>> {
        let mut query = Query::new().order_desc("mood_date");
        if let Some(start) = start {
            query = query.gte("mood_date", start.to_string());
        }
        if let Some(end) = end {
            query = query.lte("mood_date", end.to_string());
        }
        decode_all(self.gateway.list(Entity::Moods, &query).await?)
    }

    pub async fn mood_on(&self, date: NaiveDate) -> Result<Option<Mood>> {
        let query = Query::new().eq("mood_date", date.to_string()).limit(1);
        let rows = self.gateway.list(Entity::Moods, &query).await?;
        rows.into_iter().next().map(decode).transpose()
    }

    /// Insert or overwrite the entry for `entry.mood_date`.
    pub async fn save_mood(&self, entry: &MoodEntry) -> Result<Mood> {
        entry.validate()?;
        let row = self
            .gateway
            .upsert_by_key(Entity::Moods, entry.to_fields(), "mood_date")
            .await?;
        info!(date = %entry.mood_date, mood = %entry.mood_type, "mood saved");
        decode(row)
    }

    pub async fn mood_calendar(&self, year: i32, month: u32, today: NaiveDate) -> Result<MoodCalendar> {
        let (first, last) = month_bounds(year, month)?;
        let moods = self.list_moods(Some(first), Some(last)).await?;
        Ok(MoodCalendar::build(year, month, &moods, today)?)
    }

    // ── Prompts ──────────────────────────────────────────────────────

    /// A uniformly chosen prompt among up to ten unused ones.
    pub async fn random_prompt(
        &self,
        rng: &mut impl RandomSource,
    ) -> Result<Option<WritingPrompt>> {
        let query = Query::new().eq("is_used", false).limit(PROMPT_POOL);
        let mut rows = self.gateway.list(Entity::WritingPrompts, &query).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        let picked = rows.swap_remove(rng.index(rows.len()));
        decode(picked).map(Some)
    }

    pub async fn mark_prompt_used(&self, id: &str) -> Result<()> {
        let fields = json!({ "is_used": true, "used_at": now_stamp() });
        self.gateway
            .update(Entity::WritingPrompts, id, fields)
            .await?;
        Ok(())
    }

    // ── Photos ───────────────────────────────────────────────────────

    pub async fn list_photos(&self, filter: &PhotoFilter) -> Result<Vec<Photo>> {
        decode_all(self.gateway.list(Entity::Photos, &filter.to_query()).await?)
    }

    pub async fn get_photo(&self, id: &str) -> Result<Photo> {
        decode(self.gateway.get_one(Entity::Photos, id).await?)
    }

    pub async fn add_photo(&self, draft: &PhotoDraft) -> Result<Photo> {
        draft.validate()?;
        let fields = serde_json::to_value(draft)?;
        decode(self.gateway.create(Entity::Photos, fields).await?)
    }

    /// Upload to the photo bucket, then record it in the default album.
    pub async fn upload_photo(&self, file_name: &str, bytes: Vec<u8>) -> Result<Photo> {
        let stored = self
            .upload_media(&self.photo_bucket, file_name, bytes)
            .await?;
        self.add_photo(&PhotoDraft::new(stored.public_url)).await
    }

    pub async fn update_photo_caption(&self, id: &str, caption: &str) -> Result<Photo> {
        let fields = json!({ "caption": caption.trim() });
        decode(self.gateway.update(Entity::Photos, id, fields).await?)
    }

    pub async fn toggle_photo_favorite(&self, photo: &Photo) -> Result<Photo> {
        let fields = json!({ "is_favorite": !photo.is_favorite });
        decode(self.gateway.update(Entity::Photos, &photo.id, fields).await?)
    }

    pub async fn delete_photo(&self, id: &str) -> Result<()> {
        self.gateway.delete(Entity::Photos, id).await?;
        Ok(())
    }

    // ── Ideas ────────────────────────────────────────────────────────

    pub async fn list_ideas(&self, show_archived: bool) -> Result<Vec<Idea>> {
        decode_all(self.gateway.list(Entity::Ideas, &ideas_query(show_archived)).await?)
    }

    pub async fn get_idea(&self, id: &str) -> Result<Idea> {
        decode(self.gateway.get_one(Entity::Ideas, id).await?)
    }

    pub async fn create_idea(&self, draft: &IdeaDraft) -> Result<Idea> {
        draft.validate()?;
        let mut fields = serde_json::to_value(draft.normalized())?;
        if let Value::Object(map) = &mut fields {
            map.insert("is_pinned".into(), Value::Bool(false));
            map.insert("is_archived".into(), Value::Bool(false));
        }
        decode(self.gateway.create(Entity::Ideas, fields).await?)
    }

    pub async fn update_idea(&self, id: &str, draft: &IdeaDraft) -> Result<Idea> {
        draft.validate()?;
        let fields = with_updated_at(draft.normalized())?;
        decode(self.gateway.update(Entity::Ideas, id, fields).await?)
    }

    pub async fn toggle_idea_pin(&self, idea: &Idea) -> Result<Idea> {
        let fields = with_updated_at(json!({ "is_pinned": !idea.is_pinned }))?;
        decode(self.gateway.update(Entity::Ideas, &idea.id, fields).await?)
    }

    pub async fn toggle_idea_archive(&self, idea: &Idea) -> Result<Idea> {
        let fields = with_updated_at(json!({ "is_archived": !idea.is_archived }))?;
        decode(self.gateway.update(Entity::Ideas, &idea.id, fields).await?)
    }

    pub async fn delete_idea(&self, id: &str) -> Result<()> {
        self.gateway.delete(Entity::Ideas, id).await?;
        Ok(())
    }

    // ── Dashboard ────────────────────────────────────────────────────

    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let all = Query::new();
        let posts = self.gateway.list(Entity::Posts, &all).await?;
        let published_posts = posts
            .iter()
            .filter(|p| p.get("status").and_then(Value::as_str) == Some("published"))
            .count();
        Ok(DashboardStats {
            total_posts: posts.len(),
            published_posts,
            photos: self.gateway.list(Entity::Photos, &all).await?.len(),
            moods: self.gateway.list(Entity::Moods, &all).await?.len(),
            ideas: self
                .gateway
                .list(Entity::Ideas, &Query::new().eq("is_archived", false))
                .await?
                .len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::gateway::MemoryGateway;
    use crate::random::ScriptedRandom;
    use crate::records::{FeedFilter, MoodType};

    fn store() -> Store<MemoryGateway> {
        Store::new(MemoryGateway::new())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn post_lifecycle() {
        let store = store();
        let mut draft = PostDraft::new("Roses", "are red");
        draft.tags = vec![" us ".into(), "us".into()];
        let post = store.create_post(&draft).await.unwrap();
        assert_eq!(post.tags, vec!["us"]);
        assert_eq!(post.status, PostStatus::Draft);

        let published = store
            .set_post_status(&post.id, PostStatus::Published)
            .await
            .unwrap();
        assert_eq!(published.status, PostStatus::Published);

        let fav = store.toggle_post_favorite(&published).await.unwrap();
        assert!(fav.is_favorite);

        let posts = store.list_posts(&PostFilter::default()).await.unwrap();
        assert_eq!(FeedFilter::Favorite.apply(&posts).len(), 1);

        store.delete_post(&post.id).await.unwrap();
        let err = store.get_post(&post.id).await.unwrap_err();
        assert!(matches!(err, CoreError::Gateway(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn blank_post_is_rejected_before_the_gateway() {
        let store = store();
        let err = store
            .create_post(&PostDraft::new("", "body"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Blank { field: "title" })
        ));
        assert_eq!(store.gateway().row_count(Entity::Posts), 0);
    }

    #[tokio::test]
    async fn update_post_stamps_updated_at() {
        let store = store();
        let post = store.create_post(&PostDraft::new("a", "b")).await.unwrap();
        let mut draft = PostDraft::from(&post);
        draft.title = "A".into();
        let updated = store.update_post(&post.id, &draft).await.unwrap();
        assert_eq!(updated.title, "A");
        assert!(updated.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn one_mood_per_day() {
        let store = store();
        let day = date(2026, 2, 14);
        assert!(store.mood_on(day).await.unwrap().is_none());

        store
            .save_mood(&MoodEntry::new(day, MoodType::Happy))
            .await
            .unwrap();
        let mut entry = MoodEntry::new(day, MoodType::Amazing);
        entry.mood_intensity = 5;
        store.save_mood(&entry).await.unwrap();

        let saved = store.mood_on(day).await.unwrap().unwrap();
        assert_eq!(saved.mood_type, MoodType::Amazing);
        assert_eq!(saved.color.as_deref(), Some("#ff6090"));
        assert_eq!(store.gateway().row_count(Entity::Moods), 1);
    }

    #[tokio::test]
    async fn invalid_intensity_is_not_saved() {
        let store = store();
        let mut entry = MoodEntry::new(date(2026, 2, 14), MoodType::Sad);
        entry.mood_intensity = 9;
        assert!(store.save_mood(&entry).await.is_err());
        assert_eq!(store.gateway().row_count(Entity::Moods), 0);
    }

    #[tokio::test]
    async fn calendar_uses_only_that_month() {
        let store = store();
        for (d, m) in [(1, MoodType::Calm), (28, MoodType::Meh)] {
            store
                .save_mood(&MoodEntry::new(date(2026, 2, d), m))
                .await
                .unwrap();
        }
        store
            .save_mood(&MoodEntry::new(date(2026, 3, 1), MoodType::Sad))
            .await
            .unwrap();

        let moods = store
            .list_moods(Some(date(2026, 2, 1)), Some(date(2026, 2, 28)))
            .await
            .unwrap();
        assert_eq!(moods[0].mood_date, date(2026, 2, 28));

        let cal = store.mood_calendar(2026, 2, date(2026, 2, 1)).await.unwrap();
        assert_eq!(cal.recorded_days(), 2);
        assert_eq!(cal.average_intensity, Some(3.0));
        assert!(store.mood_calendar(2026, 13, date(2026, 2, 1)).await.is_err());
    }

    #[tokio::test]
    async fn random_prompt_skips_used() {
        let store = store();
        let mut rng = ScriptedRandom::constant(0.0);
        assert!(store.random_prompt(&mut rng).await.unwrap().is_none());

        store.gateway().seed(
            Entity::WritingPrompts,
            [
                json!({"id": 1, "prompt": "used", "is_used": true}),
                json!({"id": 2, "prompt": "fresh", "is_used": false}),
            ],
        );
        let picked = store.random_prompt(&mut rng).await.unwrap().unwrap();
        assert_eq!(picked.prompt, "fresh");

        store.mark_prompt_used(&picked.id).await.unwrap();
        assert!(store.random_prompt(&mut rng).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn random_prompt_draws_from_at_most_ten() {
        let store = store();
        store.gateway().seed(
            Entity::WritingPrompts,
            (0..15).map(|i| json!({"id": i, "prompt": format!("p{i}"), "is_used": false})),
        );
        let mut rng = ScriptedRandom::new(vec![0.999]);
        let picked = store.random_prompt(&mut rng).await.unwrap().unwrap();
        assert_eq!(picked.prompt, "p9");
    }

    #[tokio::test]
    async fn upload_photo_records_public_url() {
        let store = store();
        let photo = store.upload_photo("us.jpg", vec![1, 2, 3]).await.unwrap();
        assert!(photo.image_url.starts_with("memory://photos/"));
        assert!(photo.image_url.ends_with("-us.jpg"));
        assert_eq!(photo.album, "default");

        let photo = store.update_photo_caption(&photo.id, " beach ").await.unwrap();
        assert_eq!(photo.caption, "beach");
        let photo = store.toggle_photo_favorite(&photo).await.unwrap();
        let favs = store
            .list_photos(&PhotoFilter {
                is_favorite: Some(true),
                ..PhotoFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(favs, vec![photo.clone()]);

        store.delete_photo(&photo.id).await.unwrap();
        assert_eq!(store.gateway().row_count(Entity::Photos), 0);
    }

    #[tokio::test]
    async fn upload_many_names_each_file() {
        let store = store();
        let stored = store
            .upload_many(
                "post-media",
                vec![("a.png".into(), vec![1]), ("b.mp4".into(), vec![2])],
            )
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[1].path.ends_with("-b.mp4"));
        store.delete_media("post-media", &stored[0].path).await.unwrap();
        assert!(store.gateway().blob("post-media", &stored[0].path).is_none());
    }

    #[tokio::test]
    async fn ideas_pin_and_archive() {
        let store = store();
        let first = store.create_idea(&IdeaDraft::new("Picnic")).await.unwrap();
        let second = store.create_idea(&IdeaDraft::new("Museum")).await.unwrap();
        store.toggle_idea_pin(&first).await.unwrap();

        let active = store.list_ideas(false).await.unwrap();
        assert_eq!(active[0].id, first.id);

        store.toggle_idea_archive(&second).await.unwrap();
        assert_eq!(store.list_ideas(false).await.unwrap().len(), 1);
        assert_eq!(store.list_ideas(true).await.unwrap()[0].id, second.id);
    }

    #[tokio::test]
    async fn dashboard_counts() {
        let store = store();
        store.create_post(&PostDraft::new("a", "b")).await.unwrap();
        let p = store.create_post(&PostDraft::new("c", "d")).await.unwrap();
        store.set_post_status(&p.id, PostStatus::Published).await.unwrap();
        let idea = store.create_idea(&IdeaDraft::new("x")).await.unwrap();
        store.create_idea(&IdeaDraft::new("y")).await.unwrap();
        store.toggle_idea_archive(&idea).await.unwrap();
        store
            .save_mood(&MoodEntry::new(date(2026, 2, 14), MoodType::Happy))
            .await
            .unwrap();

        assert_eq!(
            store.dashboard().await.unwrap(),
            DashboardStats {
                total_posts: 2,
                published_posts: 1,
                photos: 0,
                moods: 1,
                ideas: 1,
            }
        );
    }
}
