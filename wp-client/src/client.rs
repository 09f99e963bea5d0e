use std::fmt;
use std::fs;
use std::path::Path;
use std::vec;

use chrono::Local;
use tracing::{debug, info, warn};
use xmlrpc::Value;

use crate::error::{ClientError, ClientResult, DecodeError, WordPressError};
use crate::filters;
use crate::models::{Blog, Category, Comment, CommentQuery, Post, Tag, TrackbackPing, User};
use crate::transport::{RpcTransport, XmlRpcTransport};

/// Сколько постов возвращает `get_recent_posts` по умолчанию.
pub const DEFAULT_RECENT_POSTS: i64 = 5;

/// Сколько рубрик возвращает `suggest_categories` по умолчанию.
pub const DEFAULT_SUGGESTIONS: i64 = 5;

/// Однопроходная последовательность записей из одного пакетного вызова.
///
/// Все записи уже получены, декодирование выполняется при обходе.
#[derive(Debug)]
pub struct Batch<T> {
    items: vec::IntoIter<Value>,
    filter: fn(&Value) -> Result<T, DecodeError>,
}

impl<T> Batch<T> {
    fn new(items: Vec<Value>, filter: fn(&Value) -> Result<T, DecodeError>) -> Self {
        Self {
            items: items.into_iter(),
            filter,
        }
    }
}

impl<T> Iterator for Batch<T> {
    type Item = ClientResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items
            .next()
            .map(|item| (self.filter)(&item).map_err(ClientError::from))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> ExactSizeIterator for Batch<T> {}

/// Клиент XML-RPC API блога WordPress (blogger, metaWeblog, mt, wp).
///
/// Хранит учётные данные, выбранный блог и кэш списка рубрик.
pub struct WordPressClient<T = XmlRpcTransport> {
    transport: T,
    user: String,
    password: String,
    blog_id: i64,
    categories: Option<Vec<Category>>,
}

impl<T: fmt::Debug> fmt::Debug for WordPressClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressClient")
            .field("transport", &self.transport)
            .field("user", &self.user)
            .field("blog_id", &self.blog_id)
            .field("categories", &self.categories)
            .finish_non_exhaustive()
    }
}

impl WordPressClient<XmlRpcTransport> {
    /// Создаёт клиент для XML-RPC endpoint, например
    /// `https://example.com/xmlrpc.php`.
    pub fn connect(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> ClientResult<Self> {
        Ok(Self::with_transport(
            XmlRpcTransport::new(url)?,
            user,
            password,
        ))
    }

    /// Адрес XML-RPC endpoint.
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }
}

impl<T: RpcTransport> WordPressClient<T> {
    /// Создаёт клиент поверх произвольного транспорта.
    pub fn with_transport(
        transport: T,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            user: user.into(),
            password: password.into(),
            blog_id: 0,
            categories: None,
        }
    }

    /// Выбирает активный блог. Удалённого вызова нет.
    pub fn select_blog(&mut self, blog_id: i64) {
        self.blog_id = blog_id;
    }

    /// Идентификатор активного блога.
    pub fn blog_id(&self) -> i64 {
        self.blog_id
    }

    /// Текущее содержимое кэша рубрик, если он уже заполнен.
    pub fn cached_categories(&self) -> Option<&[Category]> {
        self.categories.as_deref()
    }

    /// Список методов, которые поддерживает сервер.
    pub fn supported_methods(&self) -> ClientResult<Vec<String>> {
        let result = self.call("mt.supportedMethods", vec![])?;
        filters::array("mt.supportedMethods", result)?
            .iter()
            .map(|item| filters::string(item).map_err(ClientError::from))
            .collect()
    }

    /// Последний пост блога.
    pub fn get_last_post(&self) -> ClientResult<Post> {
        self.get_recent_posts(1)?.next().ok_or(ClientError::NoPosts)?
    }

    /// Последние `count` постов.
    pub fn get_recent_posts(&self, count: i64) -> ClientResult<Batch<Post>> {
        let args = self.blog_args(vec![filters::wire_id(count)]);
        self.batch("metaWeblog.getRecentPosts", args, filters::post)
    }

    /// Пост по идентификатору.
    pub fn get_post(&self, post_id: i64) -> ClientResult<Post> {
        let args = vec![
            Value::String(post_id.to_string()),
            self.user_value(),
            self.password_value(),
        ];
        let result = self.call("metaWeblog.getPost", args)?;
        Ok(filters::post(&result)?)
    }

    /// Данные текущего пользователя.
    pub fn get_user_info(&self) -> ClientResult<User> {
        let result = self.call("blogger.getUserInfo", self.app_key_args())?;
        Ok(filters::user(&result)?)
    }

    /// Блоги, доступные текущему пользователю.
    pub fn get_users_blogs(&self) -> ClientResult<Batch<Blog>> {
        self.batch("blogger.getUsersBlogs", self.app_key_args(), filters::blog)
    }

    /// Создаёт рубрику и возвращает её идентификатор.
    pub fn new_category(&self, category: &Category) -> ClientResult<i64> {
        let args = self.blog_args(vec![filters::new_category(category)]);
        let result = self.call("wp.newCategory", args)?;
        Ok(filters::id("wp.newCategory", &result)?)
    }

    /// Создаёт пост, назначает рубрики и, если `publish`, публикует его.
    ///
    /// Шаги не транзакционны: при ошибке назначения рубрик или публикации
    /// пост уже существует на сервере.
    pub fn new_post(&self, post: &Post, publish: bool) -> ClientResult<i64> {
        let date = post.date.unwrap_or_else(|| Local::now().naive_local());
        let args = self.blog_args(vec![
            filters::new_post_content(post, date),
            filters::draft_flag(),
        ]);
        let result = self.call("metaWeblog.newPost", args)?;
        let post_id = filters::id("metaWeblog.newPost", &result)?;
        info!(post_id, "post created");

        self.set_post_categories(post_id, &post.categories)?;

        if publish {
            self.publish_post(post_id)?;
        }

        Ok(post_id)
    }

    /// Рубрики поста.
    pub fn get_post_categories(&self, post_id: i64) -> ClientResult<Batch<Category>> {
        let args = vec![
            filters::wire_id(post_id),
            self.user_value(),
            self.password_value(),
        ];
        self.batch("mt.getPostCategories", args, filters::category)
    }

    /// Назначает посту рубрики. Первая в списке становится основной.
    pub fn set_post_categories(&self, post_id: i64, category_ids: &[i64]) -> ClientResult<()> {
        let args = vec![
            filters::wire_id(post_id),
            self.user_value(),
            self.password_value(),
            filters::category_assignments(category_ids),
        ];
        self.call("mt.setPostCategories", args)?;
        Ok(())
    }

    /// Обновляет пост, заново назначает рубрики и, если `publish`, публикует.
    ///
    /// Если сервер отклонил правку без fault, возвращает ошибку
    /// `Post edit failed` с кодом `0`, рубрики и публикация не трогаются.
    pub fn edit_post(&self, post_id: i64, post: &Post, publish: bool) -> ClientResult<()> {
        let args = vec![
            filters::wire_id(post_id),
            self.user_value(),
            self.password_value(),
            filters::edit_post_content(post),
            filters::draft_flag(),
        ];
        let result = self.call("metaWeblog.editPost", args)?;
        if filters::rejected(&result) {
            warn!(post_id, "post edit rejected");
            return Err(WordPressError::client("Post edit failed").into());
        }

        self.set_post_categories(post_id, &post.categories)?;

        if publish {
            self.publish_post(post_id)?;
        }

        Ok(())
    }

    /// Удаляет пост. `true`, если сервер ответил `1`/`true`.
    pub fn delete_post(&self, post_id: i64) -> ClientResult<bool> {
        let args = vec![
            Value::from(""),
            filters::wire_id(post_id),
            self.user_value(),
            self.password_value(),
        ];
        let result = self.call("blogger.deletePost", args)?;
        Ok(filters::accepted(&result))
    }

    /// Удаляет рубрику. Кэш рубрик не сбрасывается.
    ///
    /// Аргументы уходят в порядке WordPress: `blog_id, user, password,
    /// category_id`. Старые клиенты передавали `category_id` перед паролем.
    pub fn delete_category(&self, category_id: i64) -> ClientResult<bool> {
        let args = self.blog_args(vec![filters::wire_id(category_id)]);
        let result = self.call("wp.deleteCategory", args)?;
        Ok(filters::accepted(&result))
    }

    /// Список рубрик блога.
    ///
    /// Возвращает кэш, если он заполнен и `force_update == false`; иначе
    /// загружает список заново и целиком заменяет кэш.
    pub fn get_category_list(&mut self, force_update: bool) -> ClientResult<&[Category]> {
        if force_update || self.categories.is_none() {
            let args = self.blog_args(vec![]);
            let categories = self
                .batch("wp.getCategories", args, filters::category)?
                .collect::<ClientResult<Vec<_>>>()?;
            info!(count = categories.len(), "category cache refreshed");
            self.categories = Some(categories);
        } else {
            debug!("category cache hit");
        }

        Ok(self.categories.as_deref().unwrap_or_default())
    }

    /// Идентификатор рубрики по точному имени; `None`, если такой нет.
    pub fn get_category_id_from_name(&mut self, name: &str) -> ClientResult<Option<i64>> {
        let categories = self.get_category_list(false)?;
        Ok(categories
            .iter()
            .find(|category| category.name == name)
            .map(|category| category.id))
    }

    /// Trackback-пинги поста.
    pub fn get_trackback_pings(&self, post_id: i64) -> ClientResult<Vec<TrackbackPing>> {
        let result = self.call("mt.getTrackbackPings", vec![filters::wire_id(post_id)])?;
        filters::array("mt.getTrackbackPings", result)?
            .iter()
            .map(|item| filters::trackback_ping(item).map_err(ClientError::from))
            .collect()
    }

    /// Публикует пост. `true`, если сервер подтвердил публикацию.
    pub fn publish_post(&self, post_id: i64) -> ClientResult<bool> {
        let args = vec![
            filters::wire_id(post_id),
            self.user_value(),
            self.password_value(),
        ];
        let result = self.call("mt.publishPost", args)?;
        let published = filters::accepted(&result);
        info!(post_id, published, "post published");
        Ok(published)
    }

    /// Адреса страниц, приславших pingback на `post_url`.
    pub fn get_pingbacks(&self, post_url: &str) -> ClientResult<Vec<String>> {
        let result = self.call("pingback.extensions.getPingbacks", vec![Value::from(post_url)])?;
        filters::array("pingback.extensions.getPingbacks", result)?
            .iter()
            .map(|item| filters::string(item).map_err(ClientError::from))
            .collect()
    }

    /// Метки блога.
    pub fn get_tags(&self) -> ClientResult<Batch<Tag>> {
        let args = self.blog_args(vec![]);
        self.batch("wp.getTags", args, filters::tag)
    }

    /// Загружает файл в медиатеку и возвращает его URL.
    ///
    /// Файл читается целиком до вызова; если его нельзя прочитать, запрос
    /// не отправляется.
    pub fn new_media_object(&self, path: impl AsRef<Path>) -> ClientResult<String> {
        let path = path.as_ref();
        let bits = fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(name = %name, bytes = bits.len(), "uploading media object");

        let args = self.blog_args(vec![filters::media_object(&name, bits)]);
        let result = self.call("metaWeblog.newMediaObject", args)?;
        Ok(filters::media_url(&result)?)
    }

    /// Рубрики, подходящие под начало строки `text`.
    pub fn suggest_categories(&self, text: &str, max_results: i64) -> ClientResult<Batch<Category>> {
        let args = self.blog_args(vec![Value::from(text), filters::wire_id(max_results)]);
        self.batch("wp.suggestCategories", args, filters::category)
    }

    /// Комментарий по идентификатору.
    pub fn get_comment(&self, comment_id: i64) -> ClientResult<Comment> {
        let args = self.blog_args(vec![filters::wire_id(comment_id)]);
        let result = self.call("wp.getComment", args)?;
        Ok(filters::comment(&result)?)
    }

    /// Комментарии по фильтру `query`.
    pub fn get_comments(&self, query: &CommentQuery) -> ClientResult<Batch<Comment>> {
        let args = self.blog_args(vec![filters::comment_query(query)]);
        self.batch("wp.getComments", args, filters::comment)
    }

    fn call(&self, method: &str, args: Vec<Value>) -> ClientResult<Value> {
        self.transport
            .invoke(method, args)
            .map_err(ClientError::from)
    }

    fn batch<E>(
        &self,
        method: &str,
        args: Vec<Value>,
        filter: fn(&Value) -> Result<E, DecodeError>,
    ) -> ClientResult<Batch<E>> {
        let items = filters::array(method, self.call(method, args)?)?;
        Ok(Batch::new(items, filter))
    }

    fn user_value(&self) -> Value {
        Value::from(self.user.as_str())
    }

    fn password_value(&self) -> Value {
        Value::from(self.password.as_str())
    }

    /// `blog_id, user, password, ...rest`
    fn blog_args(&self, rest: Vec<Value>) -> Vec<Value> {
        let mut args = vec![
            filters::wire_id(self.blog_id),
            self.user_value(),
            self.password_value(),
        ];
        args.extend(rest);
        args
    }

    /// blogger.* принимает пустой appkey первым аргументом.
    fn app_key_args(&self) -> Vec<Value> {
        vec![Value::from(""), self.user_value(), self.password_value()]
    }
}
