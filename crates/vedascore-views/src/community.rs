//! Community discussion feed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vedascore_core::markup::html_escape;
use vedascore_core::model::{Comment, LikeStatus, ModerationStatus, NewPost, Post};
use vedascore_core::VedaApi;

use crate::dispatch::Dispatcher;
use crate::loader::{error_html, LoadSpec, ResourceLoader};
use crate::surface::Surface;

pub const POSTS_FEED: &str = "posts-feed";
pub const LOAD_MORE: &str = "load-more-btn";

pub fn like_region(post_id: u64) -> String {
    format!("like-btn-{post_id}")
}

pub fn comment_count_region(post_id: u64) -> String {
    format!("comment-count-{post_id}")
}

pub fn comments_region(post_id: u64) -> String {
    format!("comments-{post_id}")
}

pub fn comments_list_region(post_id: u64) -> String {
    format!("comments-list-{post_id}")
}

#[derive(Debug)]
struct FeedState {
    current_page: u32,
    has_more: bool,
    open_threads: HashMap<u64, bool>,
    comment_counts: HashMap<u64, u32>,
}

/// Clears the loading flag when a page load ends, however it ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Paginated post feed with likes and comment threads.
pub struct FeedController {
    api: Arc<dyn VedaApi>,
    surface: Arc<dyn Surface>,
    loader: ResourceLoader,
    loading: AtomicBool,
    state: Mutex<FeedState>,
}

impl FeedController {
    pub fn new(api: Arc<dyn VedaApi>, surface: Arc<dyn Surface>) -> Self {
        Self {
            api,
            loader: ResourceLoader::new(surface.clone()),
            surface,
            loading: AtomicBool::new(false),
            state: Mutex::new(FeedState {
                current_page: 1,
                has_more: true,
                open_threads: HashMap::new(),
                comment_counts: HashMap::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_page(&self) -> u32 {
        self.state().current_page
    }

    pub fn has_more(&self) -> bool {
        self.state().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Fetch one page of posts.
    ///
    /// Returns false without doing anything when another page load is
    /// already in flight.
    pub async fn load_posts(&self, page: u32, append: bool) -> bool {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(page, "page load already in flight, dropping request");
            return false;
        }
        let _guard = LoadingGuard(&self.loading);

        let spec = LoadSpec::new("Error loading posts").with_loading("Loading posts...");
        let regions: &[&str] = if append { &[] } else { &[POSTS_FEED] };
        let result = self
            .loader
            .fetch(regions, &spec, self.api.list_posts(page), |e| {
                if !append {
                    self.surface
                        .set_html(POSTS_FEED, error_html(&spec.error_prefix, e));
                }
            })
            .await;
        let Ok(data) = result else {
            return true;
        };

        if !append {
            self.surface.set_html(POSTS_FEED, String::new());
        }
        if data.posts.is_empty() && page == 1 {
            self.surface.set_html(POSTS_FEED, EMPTY_FEED.to_string());
            return true;
        }
        {
            let mut state = self.state();
            for post in &data.posts {
                state.comment_counts.insert(post.id, post.comments_count);
            }
            state.has_more = data.has_next;
            state.current_page = page;
        }
        for post in &data.posts {
            self.surface.append_html(POSTS_FEED, &render_post(post));
        }
        self.surface.set_visible(LOAD_MORE, data.has_next);
        true
    }

    /// Load the next page in append mode.
    pub async fn load_more(&self) -> bool {
        let next = {
            let state = self.state();
            if !state.has_more {
                return false;
            }
            state.current_page + 1
        };
        if self.is_loading() {
            return false;
        }
        self.load_posts(next, true).await
    }

    pub async fn like(&self, post_id: u64) {
        let spec = LoadSpec::new("Error liking post");
        if let Some(status) = self.loader.notify(&spec, self.api.like_post(post_id)).await {
            self.surface
                .set_html(&like_region(post_id), render_like_button(post_id, &status));
        }
    }

    /// Open or close a post's comment thread.
    pub async fn toggle_comments(&self, post_id: u64) {
        let open = self.state().open_threads.get(&post_id).copied().unwrap_or(false);
        if open {
            self.state().open_threads.insert(post_id, false);
            self.surface.set_visible(&comments_region(post_id), false);
            return;
        }
        self.reload_comments(post_id).await;
        self.state().open_threads.insert(post_id, true);
        self.surface.set_visible(&comments_region(post_id), true);
    }

    pub fn is_thread_open(&self, post_id: u64) -> bool {
        self.state().open_threads.get(&post_id).copied().unwrap_or(false)
    }

    async fn reload_comments(&self, post_id: u64) {
        let spec = LoadSpec::new("Error loading comments");
        self.loader
            .load(
                &comments_list_region(post_id),
                &spec,
                self.api.list_comments(post_id),
                |list| render_comments(&list.comments),
            )
            .await;
    }

    pub async fn submit_comment(&self, post_id: u64, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            self.surface.notify("Please enter a comment");
            return;
        }

        let spec = LoadSpec::new("Error posting comment");
        if self
            .loader
            .notify(&spec, self.api.add_comment(post_id, content))
            .await
            .is_none()
        {
            return;
        }

        self.reload_comments(post_id).await;
        self.state().open_threads.insert(post_id, true);
        self.surface.set_visible(&comments_region(post_id), true);

        let count = {
            let mut state = self.state();
            let count = state.comment_counts.entry(post_id).or_insert(0);
            *count += 1;
            *count
        };
        self.surface
            .set_html(&comment_count_region(post_id), count.to_string());
    }

    pub async fn create_post(&self, title: &str, content: &str) {
        let (title, content) = (title.trim(), content.trim());
        if title.is_empty() || content.is_empty() {
            self.surface.notify("Please fill in both title and content");
            return;
        }

        let spec = LoadSpec::new("Error creating post");
        let new_post = NewPost::text(title, content);
        let Some(created) = self.loader.notify(&spec, self.api.create_post(&new_post)).await else {
            return;
        };
        self.load_posts(1, false).await;
        let mut message = "Post created successfully!".to_string();
        if created.moderation_status == ModerationStatus::Flagged {
            message.push_str(" Your post is under review.");
        }
        self.surface.notify(&message);
    }

    /// Register `community.*` actions.
    pub fn register(self: &Arc<Self>, dispatcher: &mut Dispatcher) {
        let this = self.clone();
        dispatcher.register("community.load", move |params| {
            let this = this.clone();
            async move {
                let page = match params.opt("page") {
                    Some(_) => params.parse("page")?,
                    None => 1,
                };
                this.load_posts(page, false).await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("community.load_more", move |_| {
            let this = this.clone();
            async move {
                this.load_more().await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("community.like", move |params| {
            let this = this.clone();
            async move {
                this.like(params.parse("post_id")?).await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("community.toggle_comments", move |params| {
            let this = this.clone();
            async move {
                this.toggle_comments(params.parse("post_id")?).await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("community.comment", move |params| {
            let this = this.clone();
            async move {
                let post_id = params.parse("post_id")?;
                this.submit_comment(post_id, params.opt("content").unwrap_or_default())
                    .await;
                Ok(())
            }
        });

        let this = self.clone();
        dispatcher.register("community.create_post", move |params| {
            let this = this.clone();
            async move {
                this.create_post(
                    params.opt("title").unwrap_or_default(),
                    params.opt("content").unwrap_or_default(),
                )
                .await;
                Ok(())
            }
        });
    }
}

const EMPTY_FEED: &str = "<div class=\"empty-state\"><h3>No posts yet</h3><p>Be the first to start a discussion!</p></div>";

fn render_like_button(post_id: u64, status: &LikeStatus) -> String {
    format!(
        "<button class=\"post-action like-btn{}\" data-post-id=\"{post_id}\"><span class=\"like-count\">{}</span></button>",
        if status.liked { " liked" } else { "" },
        status.likes_count
    )
}

/// A post card, with its like button, comment counter and a hidden thread.
pub fn render_post(post: &Post) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"post-card\">\n");
    html.push_str(&format!(
        "<div class=\"post-header\"><div class=\"post-avatar\">{}</div><div class=\"post-user-info\"><div class=\"post-user-name\">{}</div><div class=\"post-time\">{}</div></div></div>\n",
        html_escape(&post.user_avatar),
        html_escape(&post.user_name),
        html_escape(&post.created_at)
    ));
    html.push_str(&format!(
        "<div class=\"post-title\">{}</div>\n<div class=\"post-content\">{}</div>\n",
        html_escape(&post.title),
        html_escape(&post.content)
    ));
    html.push_str("<div class=\"post-actions\">");
    html.push_str(&format!(
        "<div id=\"{}\">{}</div>",
        like_region(post.id),
        render_like_button(
            post.id,
            &LikeStatus {
                liked: post.user_liked,
                likes_count: post.likes_count
            }
        )
    ));
    html.push_str(&format!(
        "<button class=\"post-action comment-btn\" data-post-id=\"{}\"><span class=\"comment-count\" id=\"{}\">{}</span></button>",
        post.id,
        comment_count_region(post.id),
        post.comments_count
    ));
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<div class=\"comments-section\" id=\"{}\" style=\"display: none;\"><div class=\"comments-list\" id=\"{}\"></div></div>\n",
        comments_region(post.id),
        comments_list_region(post.id)
    ));
    html.push_str("</div>\n");
    html
}

pub fn render_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "<div class=\"empty-state\">No comments yet</div>".to_string();
    }
    comments
        .iter()
        .map(|c| {
            format!(
                "<div class=\"comment\"><div class=\"comment-avatar\">{}</div><div class=\"comment-content\"><div class=\"comment-user\">{}</div><div class=\"comment-text\">{}</div><div class=\"comment-time\">{}</div></div></div>\n",
                html_escape(&c.user_avatar),
                html_escape(&c.user_name),
                html_escape(&c.content),
                html_escape(&c.created_at)
            )
        })
        .collect()
}
