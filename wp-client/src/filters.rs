//! Преобразование XML-RPC записей в доменные модели и обратно.
//!
//! Все функции чистые. Отсутствующие необязательные ключи дают значение по
//! умолчанию, идентификаторы приводятся к `i64` на границе.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use xmlrpc::Value;

use crate::error::DecodeError;
use crate::models::{Blog, Category, Comment, CommentQuery, Post, Tag, TrackbackPing, User};

type Record = BTreeMap<String, Value>;

/// Формат `dateCreated`, если сервер прислал дату строкой.
const WIRE_DATE_FORMAT: &str = "%Y%m%dT%H:%M:%S";

pub(crate) fn post(value: &Value) -> Result<Post, DecodeError> {
    let record = record(value)?;

    let mut categories = Vec::new();
    let mut category_names = Vec::new();
    if let Some(Value::Array(items)) = record.get("categories") {
        for item in items {
            match coerce_id("categories", item) {
                Ok(id) => categories.push(id),
                Err(_) => category_names.push(text_of(item)),
            }
        }
    }

    Ok(Post {
        id: required_id(record, "postid")?,
        title: text(record, "title"),
        date: record.get("dateCreated").map(decode_date).transpose()?,
        perma_link: text(record, "permaLink"),
        description: text(record, "description"),
        text_more: text(record, "mt_text_more"),
        excerpt: text(record, "mt_excerpt"),
        link: text(record, "link"),
        categories,
        category_names,
        user: optional_id(record, "userid")?,
        allow_pings: record.get("mt_allow_pings").is_some_and(equals_one),
        allow_comments: record.get("mt_allow_comments").is_some_and(equals_one),
        keywords: text(record, "mt_keywords"),
    })
}

/// Принимает обе формы записи рубрики и применяет каждую найденную.
///
/// Если запись содержит обе формы, поля старой формы перезаписывают новые.
pub(crate) fn category(value: &Value) -> Result<Category, DecodeError> {
    let record = record(value)?;
    let mut category = Category::default();

    if let Some(id) = record.get("categoryId") {
        category.id = coerce_id("categoryId", id)?;
        category.parent_id = optional_id(record, "parentId")?;
        category.name = text(record, "categoryName");
        category.slug = text(record, "slug");
        category.description = text(record, "categoryDescription");
        category.html_url = text(record, "htmlUrl");
        category.rss_url = text(record, "rssUrl");
    }

    if let Some(id) = record.get("category_id") {
        category.id = coerce_id("category_id", id)?;
        category.name = text(record, "category_name");
    }

    if let Some(primary) = record.get("isPrimary") {
        category.is_primary = truthy(primary);
    }

    Ok(category)
}

pub(crate) fn comment(value: &Value) -> Result<Comment, DecodeError> {
    let record = record(value)?;
    Ok(Comment {
        id: required_id(record, "comment_id")?,
        user_id: optional_id(record, "user_id")?,
        parent: optional_id(record, "parent")?,
        status: text(record, "status"),
        content: text(record, "content"),
        link: text(record, "link"),
        post_id: optional_id(record, "post_id")?,
        post_title: text(record, "post_title"),
        author: text(record, "author"),
        author_url: text(record, "author_url"),
        author_email: text(record, "author_email"),
        author_ip: text(record, "author_ip"),
    })
}

pub(crate) fn tag(value: &Value) -> Result<Tag, DecodeError> {
    let record = record(value)?;
    Ok(Tag {
        id: required_id(record, "tag_id")?,
        name: text(record, "name"),
        rss_url: text(record, "rss_url"),
        html_url: text(record, "html_url"),
        slug: text(record, "slug"),
        count: optional_id(record, "count")?,
    })
}

// email в ответе есть не всегда, поэтому не читается
pub(crate) fn user(value: &Value) -> Result<User, DecodeError> {
    let record = record(value)?;
    Ok(User {
        id: required_id(record, "userid")?,
        first_name: text(record, "firstname"),
        last_name: text(record, "lastname"),
        nickname: text(record, "nickname"),
        email: String::new(),
    })
}

pub(crate) fn blog(value: &Value) -> Result<Blog, DecodeError> {
    let record = record(value)?;
    Ok(Blog {
        id: required_id(record, "blogid")?,
        name: text(record, "blogName"),
        url: text(record, "url"),
        is_admin: record.get("isAdmin").is_some_and(truthy),
    })
}

pub(crate) fn trackback_ping(value: &Value) -> Result<TrackbackPing, DecodeError> {
    let record = record(value)?;
    Ok(TrackbackPing {
        title: text(record, "pingTitle"),
        url: text(record, "pingURL"),
        ip: text(record, "pingIP"),
    })
}

pub(crate) fn string(value: &Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(DecodeError::new(
            "<item>",
            format!("expected string, got {}", kind(other)),
        )),
    }
}

pub(crate) fn array(method: &str, value: Value) -> Result<Vec<Value>, DecodeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(DecodeError::new(
            method,
            format!("expected array, got {}", kind(&other)),
        )),
    }
}

/// Идентификатор в ответе на `newPost`/`newCategory`.
pub(crate) fn id(method: &str, value: &Value) -> Result<i64, DecodeError> {
    coerce_id(method, value)
}

/// Сервер подтвердил операцию: `1` или `true`.
pub(crate) fn accepted(value: &Value) -> bool {
    equals_one(value)
}

/// Отказ без fault: только `0` или `false`, прочие ответы отказом не считаются.
pub(crate) fn rejected(value: &Value) -> bool {
    matches!(value, Value::Int(0) | Value::Int64(0) | Value::Bool(false))
}

/// Флаг `publish` в `newPost`/`editPost`: пост создаётся черновиком.
pub(crate) fn draft_flag() -> Value {
    Value::Int(0)
}

pub(crate) fn media_url(value: &Value) -> Result<String, DecodeError> {
    let record = record(value)?;
    match record.get("url") {
        Some(Value::String(url)) => Ok(url.clone()),
        Some(other) => Err(DecodeError::new(
            "url",
            format!("expected string, got {}", kind(other)),
        )),
        None => Err(DecodeError::new("url", "missing")),
    }
}

// ---- client -> wire ----

pub(crate) fn wire_id(id: i64) -> Value {
    i32::try_from(id).map_or(Value::Int64(id), Value::Int)
}

/// Список назначений рубрик: первая помечается основной.
pub(crate) fn category_assignments(ids: &[i64]) -> Value {
    let items = ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let mut entry = Record::new();
            entry.insert("categoryId".to_string(), wire_id(*id));
            entry.insert("isPrimary".to_string(), Value::Int(i32::from(index == 0)));
            Value::Struct(entry)
        })
        .collect();
    Value::Array(items)
}

pub(crate) fn new_post_content(post: &Post, date: NaiveDateTime) -> Value {
    let mut content = Record::new();
    content.insert("title".to_string(), Value::from(post.title.as_str()));
    content.insert(
        "description".to_string(),
        Value::from(post.description.as_str()),
    );
    content.insert(
        "mt_text_more".to_string(),
        Value::from(post.text_more.as_str()),
    );
    content.insert(
        "mt_keywords".to_string(),
        Value::from(post.keywords.as_str()),
    );
    content.insert("dateCreated".to_string(), encode_date(date));
    Value::Struct(content)
}

pub(crate) fn edit_post_content(post: &Post) -> Value {
    let mut content = Record::new();
    content.insert("title".to_string(), Value::from(post.title.as_str()));
    content.insert(
        "description".to_string(),
        Value::from(post.description.as_str()),
    );
    content.insert(
        "permaLink".to_string(),
        Value::from(post.perma_link.as_str()),
    );
    content.insert("mt_allow_pings".to_string(), Value::Bool(post.allow_pings));
    content.insert(
        "mt_text_more".to_string(),
        Value::from(post.text_more.as_str()),
    );
    content.insert(
        "mt_excerpt".to_string(),
        Value::from(post.excerpt.as_str()),
    );
    if let Some(date) = post.date {
        content.insert("dateCreated".to_string(), encode_date(date));
    }
    Value::Struct(content)
}

pub(crate) fn new_category(category: &Category) -> Value {
    let mut content = Record::new();
    content.insert("name".to_string(), Value::from(category.name.as_str()));
    content.insert("parent_id".to_string(), wire_id(category.parent_id));
    content.insert("slug".to_string(), Value::from(category.slug.as_str()));
    content.insert(
        "description".to_string(),
        Value::from(category.description.as_str()),
    );
    Value::Struct(content)
}

pub(crate) fn media_object(name: &str, bits: Vec<u8>) -> Value {
    let mut content = Record::new();
    content.insert("name".to_string(), Value::from(name));
    content.insert("bits".to_string(), Value::Base64(bits));
    Value::Struct(content)
}

pub(crate) fn comment_query(query: &CommentQuery) -> Value {
    let mut content = Record::new();
    content.insert("status".to_string(), Value::from(query.status.as_str()));
    content.insert("post_id".to_string(), wire_id(query.post_id));
    content.insert("number".to_string(), wire_id(query.number));
    content.insert("offset".to_string(), wire_id(query.offset));
    Value::Struct(content)
}

pub(crate) fn encode_date(date: NaiveDateTime) -> Value {
    Value::DateTime(iso8601::DateTime {
        date: iso8601::Date::YMD {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        },
        time: iso8601::Time {
            hour: date.hour(),
            minute: date.minute(),
            second: date.second(),
            millisecond: 0,
            tz_offset_hours: 0,
            tz_offset_minutes: 0,
        },
    })
}

// ---- helpers ----

fn record(value: &Value) -> Result<&Record, DecodeError> {
    match value {
        Value::Struct(record) => Ok(record),
        other => Err(DecodeError::new(
            "<record>",
            format!("expected struct, got {}", kind(other)),
        )),
    }
}

fn text(record: &Record, key: &str) -> String {
    record.get(key).map(text_of).unwrap_or_default()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Int64(i) => i.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn required_id(record: &Record, key: &str) -> Result<i64, DecodeError> {
    match record.get(key) {
        Some(value) => coerce_id(key, value),
        None => Err(DecodeError::new(key, "missing")),
    }
}

/// Отсутствующий или пустой идентификатор считается нулём.
fn optional_id(record: &Record, key: &str) -> Result<i64, DecodeError> {
    match record.get(key) {
        None | Some(Value::Nil) => Ok(0),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0),
        Some(value) => coerce_id(key, value),
    }
}

fn coerce_id(key: &str, value: &Value) -> Result<i64, DecodeError> {
    match value {
        Value::Int(i) => Ok(i64::from(*i)),
        Value::Int64(i) => Ok(*i),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| DecodeError::new(key, format!("not an integer: {s:?}"))),
        other => Err(DecodeError::new(
            key,
            format!("expected integer, got {}", kind(other)),
        )),
    }
}

fn equals_one(value: &Value) -> bool {
    matches!(value, Value::Int(1) | Value::Int64(1) | Value::Bool(true))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Int64(i) => *i != 0,
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}

fn decode_date(value: &Value) -> Result<NaiveDateTime, DecodeError> {
    match value {
        Value::DateTime(dt) => from_iso8601(dt),
        Value::String(s) => NaiveDateTime::parse_from_str(s, WIRE_DATE_FORMAT)
            .map_err(|e| DecodeError::new("dateCreated", format!("{s:?}: {e}"))),
        other => Err(DecodeError::new(
            "dateCreated",
            format!("expected dateTime.iso8601, got {}", kind(other)),
        )),
    }
}

fn from_iso8601(dt: &iso8601::DateTime) -> Result<NaiveDateTime, DecodeError> {
    let date = match dt.date {
        iso8601::Date::YMD { year, month, day } => NaiveDate::from_ymd_opt(year, month, day),
        iso8601::Date::Week { year, ww, d } => {
            iso_weekday(d).and_then(|weekday| NaiveDate::from_isoywd_opt(year, ww, weekday))
        }
        iso8601::Date::Ordinal { year, ddd } => NaiveDate::from_yo_opt(year, ddd),
    };
    let time = NaiveTime::from_hms_milli_opt(
        dt.time.hour,
        dt.time.minute,
        dt.time.second,
        dt.time.millisecond,
    );

    match (date, time) {
        (Some(date), Some(time)) => Ok(date.and_time(time)),
        _ => Err(DecodeError::new("dateCreated", "date out of range")),
    }
}

fn iso_weekday(day: u32) -> Option<Weekday> {
    match day {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Int(_) => "int",
        Value::Int64(_) => "i8",
        Value::Bool(_) => "boolean",
        Value::String(_) => "string",
        Value::Double(_) => "double",
        Value::DateTime(_) => "dateTime.iso8601",
        Value::Base64(_) => "base64",
        Value::Struct(_) => "struct",
        Value::Array(_) => "array",
        Value::Nil => "nil",
    }
}
