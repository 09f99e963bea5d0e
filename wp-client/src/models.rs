use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Блог, доступный пользователю.
pub struct Blog {
    /// Идентификатор блога.
    pub id: i64,
    /// Название блога.
    pub name: String,
    /// Адрес блога.
    pub url: String,
    /// Пользователь является администратором блога.
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// Отображаемое имя.
    pub nickname: String,
    /// Email. Зарезервирован, сервер его не заполняет.
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Рубрика блога.
///
/// Записи в старом формате (`category_id`/`category_name`) заполняют только
/// `id` и `name`.
pub struct Category {
    /// Идентификатор рубрики.
    pub id: i64,
    /// Идентификатор родительской рубрики (`0` — корень).
    pub parent_id: i64,
    /// Название.
    pub name: String,
    /// Slug для URL.
    pub slug: String,
    /// Описание.
    pub description: String,
    /// RSS-лента рубрики.
    pub rss_url: String,
    /// HTML-страница рубрики.
    pub html_url: String,
    /// Основная рубрика поста.
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Автор-пользователь (`0` — гость).
    pub user_id: i64,
    /// Родительский комментарий (`0` — верхний уровень).
    pub parent: i64,
    /// Статус модерации (`approve`, `hold`, `spam`).
    pub status: String,
    /// Текст комментария.
    pub content: String,
    /// Ссылка на комментарий.
    pub link: String,
    /// Пост, к которому оставлен комментарий.
    pub post_id: i64,
    /// Заголовок поста.
    pub post_title: String,
    /// Имя автора.
    pub author: String,
    /// Сайт автора.
    pub author_url: String,
    /// Email автора.
    pub author_email: String,
    /// IP автора.
    pub author_ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок поста.
    pub title: String,
    /// Дата создания в часовом поясе блога.
    pub date: Option<NaiveDateTime>,
    /// Постоянная ссылка.
    pub perma_link: String,
    /// Основной текст.
    pub description: String,
    /// Текст после «читать далее».
    pub text_more: String,
    /// Анонс.
    pub excerpt: String,
    /// Ссылка на пост.
    pub link: String,
    /// Идентификаторы рубрик. Первая — основная.
    pub categories: Vec<i64>,
    /// Рубрики, которые сервер вернул по имени, а не по идентификатору.
    pub category_names: Vec<String>,
    /// Автор поста.
    pub user: i64,
    /// Разрешены пинги.
    pub allow_pings: bool,
    /// Разрешены комментарии.
    pub allow_comments: bool,
    /// Ключевые слова через запятую.
    pub keywords: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Метка блога.
pub struct Tag {
    /// Идентификатор метки.
    pub id: i64,
    /// Название.
    pub name: String,
    /// RSS-лента метки.
    pub rss_url: String,
    /// HTML-страница метки.
    pub html_url: String,
    /// Slug для URL.
    pub slug: String,
    /// Число постов с меткой.
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Trackback-пинг поста.
pub struct TrackbackPing {
    /// Заголовок пингующей страницы.
    pub title: String,
    /// Адрес пингующей страницы.
    pub url: String,
    /// IP отправителя.
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Параметры выборки комментариев.
pub struct CommentQuery {
    /// Статус модерации.
    pub status: String,
    /// Пост (`0` — все посты).
    pub post_id: i64,
    /// Сколько комментариев вернуть.
    pub number: i64,
    /// Смещение от начала выборки.
    pub offset: i64,
}

impl Default for CommentQuery {
    fn default() -> Self {
        Self {
            status: "approve".to_string(),
            post_id: 0,
            number: 10,
            offset: 0,
        }
    }
}

impl fmt::Display for Blog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blog {}: '{}'", self.id, self.name)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User {}: '{}'", self.id, self.nickname)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Category {}: '{}'", self.id, self.name)
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comment {}: '{}'", self.id, self.content)
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Post {}: '{}'", self.id, self.title)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag {}: '{}'", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn comment_query_defaults_to_approved_first_page() {
        let query = CommentQuery::default();
        assert_eq!(query.status, "approve");
        assert_eq!(query.post_id, 0);
        assert_eq!(query.number, 10);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn display_shows_id_and_label() {
        let post = Post {
            id: 42,
            title: "Hello".to_string(),
            ..Post::default()
        };
        assert_eq!(post.to_string(), "Post 42: 'Hello'");

        let category = Category {
            id: 3,
            name: "News".to_string(),
            ..Category::default()
        };
        assert_eq!(category.to_string(), "Category 3: 'News'");
    }

    #[test]
    fn post_serializes_date_as_iso_string() {
        let post = Post {
            id: 1,
            date: NaiveDate::from_ymd_opt(2009, 4, 12)
                .and_then(|d| d.and_hms_opt(10, 20, 30)),
            ..Post::default()
        };

        let json = serde_json::to_value(&post).expect("post must serialize");
        assert_eq!(json["date"], "2009-04-12T10:20:30");
        assert_eq!(json["categories"], serde_json::json!([]));
    }
}
