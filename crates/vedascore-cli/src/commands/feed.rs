//! The `vedascore feed` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::Source;

pub async fn execute(source: &Source, page: u32) -> Result<()> {
    anyhow::ensure!(page >= 1, "page must be at least 1");
    let session = source.connect()?;
    let data = session.api.list_posts(page).await?;

    if data.posts.is_empty() {
        println!("No posts yet. Be the first to share something!");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Author", "Likes", "Comments", "Posted"]);
    for post in &data.posts {
        let likes = if post.user_liked {
            format!("{} (liked)", post.likes_count)
        } else {
            post.likes_count.to_string()
        };
        table.add_row(vec![
            Cell::new(post.id),
            Cell::new(&post.title),
            Cell::new(&post.user_name),
            Cell::new(likes),
            Cell::new(post.comments_count),
            Cell::new(&post.created_at),
        ]);
    }
    println!("{table}");

    if data.has_next {
        println!("More posts: vedascore feed --page {}", page + 1);
    }
    Ok(())
}
