mod logging;
mod settings;

use std::fmt::Display;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use wp_client::{
    Category, ClientError, CommentQuery, DEFAULT_RECENT_POSTS, DEFAULT_SUGGESTIONS, Post,
    WordPressClient,
};

use crate::logging::init_logging;
use crate::settings::{Overrides, Settings};

#[derive(Debug, Parser)]
#[command(name = "wp-cli", version, about = "CLI клиент для XML-RPC API WordPress")]
struct Cli {
    /// Адрес блога или XML-RPC endpoint (иначе WP_URL).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Имя пользователя (иначе WP_USER).
    #[arg(long, global = true)]
    user: Option<String>,

    /// Пароль (иначе WP_PASSWORD).
    #[arg(long, global = true)]
    password: Option<String>,

    /// Идентификатор блога (иначе WP_BLOG_ID или 0).
    #[arg(long, global = true)]
    blog: Option<i64>,

    /// Печатать результат в JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Подробнее логировать в stderr (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Блоги пользователя.
    Blogs,
    /// Данные текущего пользователя.
    Whoami,
    /// Методы, которые поддерживает сервер.
    Methods,
    /// Последние посты.
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_POSTS)]
        count: i64,
    },
    /// Пост по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Последний пост.
    Last,
    /// Список рубрик.
    Categories {
        /// Загрузить список заново.
        #[arg(long)]
        refresh: bool,
    },
    /// Идентификатор рубрики по имени.
    CategoryId {
        #[arg(long)]
        name: String,
    },
    /// Создание рубрики.
    NewCategory {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        parent: i64,
        #[arg(long, default_value = "")]
        slug: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Удаление рубрики.
    DeleteCategory {
        #[arg(long)]
        id: i64,
    },
    /// Метки блога.
    Tags,
    /// Подсказка рубрик по началу имени.
    Suggest {
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = DEFAULT_SUGGESTIONS)]
        max: i64,
    },
    /// Список комментариев.
    Comments {
        #[arg(long, default_value = "approve")]
        status: String,
        #[arg(long, default_value_t = 0)]
        post_id: i64,
        #[arg(long, default_value_t = 10)]
        number: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Комментарий по id.
    Comment {
        #[arg(long)]
        id: i64,
    },
    /// Загрузка файла в медиатеку.
    Upload {
        #[arg(long)]
        file: PathBuf,
    },
    /// Создание поста.
    ///
    /// `--image` загружается в медиатеку и вставляется в конец текста,
    /// `--category` ищется по имени.
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        publish: bool,
    },
    /// Правка поста.
    ///
    /// Рубрики поста сохраняются.
    Edit {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        publish: bool,
    },
    /// Публикация поста.
    Publish {
        #[arg(long)]
        id: i64,
    },
    /// Удаление поста.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Trackback-пинги поста.
    Trackbacks {
        #[arg(long)]
        id: i64,
    },
    /// Pingback-и на адрес поста.
    Pingbacks {
        #[arg(long)]
        url: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = Settings::from_env(Overrides {
        url: cli.url,
        user: cli.user,
        password: cli.password,
        blog_id: cli.blog,
    })?;
    init_logging(cli.verbose, &settings.log_level)?;

    let mut client = WordPressClient::connect(&settings.url, &settings.user, &settings.password)
        .map_err(map_client_error)?;
    client.select_blog(settings.blog_id);
    info!(endpoint = client.endpoint(), blog_id = settings.blog_id, "client ready");

    let json = cli.json;
    match cli.command {
        Command::Blogs => {
            let blogs = collect(client.get_users_blogs())?;
            print_all(json, &blogs)?;
        }
        Command::Whoami => {
            let user = client.get_user_info().map_err(map_client_error)?;
            print_one(json, &user)?;
        }
        Command::Methods => {
            let methods = client.supported_methods().map_err(map_client_error)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&methods)?);
            } else {
                methods.iter().for_each(|method| println!("{method}"));
            }
        }
        Command::Recent { count } => {
            let posts = collect(client.get_recent_posts(count))?;
            print_all(json, &posts)?;
        }
        Command::Get { id } => {
            let post = client.get_post(id).map_err(map_client_error)?;
            print_one(json, &post)?;
        }
        Command::Last => {
            let post = client.get_last_post().map_err(map_client_error)?;
            print_one(json, &post)?;
        }
        Command::Categories { refresh } => {
            let categories = client
                .get_category_list(refresh)
                .map_err(map_client_error)?;
            print_all(json, categories)?;
        }
        Command::CategoryId { name } => {
            match client
                .get_category_id_from_name(&name)
                .map_err(map_client_error)?
            {
                Some(id) => println!("{id}"),
                None => return Err(anyhow!("рубрика не найдена: {name}")),
            }
        }
        Command::NewCategory {
            name,
            parent,
            slug,
            description,
        } => {
            let category = Category {
                name,
                parent_id: parent,
                slug,
                description,
                ..Category::default()
            };
            let id = client.new_category(&category).map_err(map_client_error)?;
            println!("Рубрика создана: id={id}");
        }
        Command::DeleteCategory { id } => {
            let deleted = client.delete_category(id).map_err(map_client_error)?;
            println!("Рубрика удалена: id={id} ({deleted})");
        }
        Command::Tags => {
            let tags = collect(client.get_tags())?;
            print_all(json, &tags)?;
        }
        Command::Suggest { text, max } => {
            let categories = collect(client.suggest_categories(&text, max))?;
            print_all(json, &categories)?;
        }
        Command::Comments {
            status,
            post_id,
            number,
            offset,
        } => {
            let query = CommentQuery {
                status,
                post_id,
                number,
                offset,
            };
            let comments = collect(client.get_comments(&query))?;
            print_all(json, &comments)?;
        }
        Command::Comment { id } => {
            let comment = client.get_comment(id).map_err(map_client_error)?;
            print_one(json, &comment)?;
        }
        Command::Upload { file } => {
            let url = client
                .new_media_object(&file)
                .map_err(map_client_error)
                .with_context(|| format!("не удалось загрузить {}", file.display()))?;
            println!("{url}");
        }
        Command::Post {
            title,
            content,
            categories,
            image,
            publish,
        } => {
            let description = match image {
                Some(image) => {
                    let src = client
                        .new_media_object(&image)
                        .map_err(map_client_error)
                        .with_context(|| format!("не удалось загрузить {}", image.display()))?;
                    embed_image(&content, &src)
                }
                None => content,
            };

            let mut category_ids = Vec::with_capacity(categories.len());
            for name in &categories {
                let id = client
                    .get_category_id_from_name(name)
                    .map_err(map_client_error)?
                    .ok_or_else(|| anyhow!("рубрика не найдена: {name}"))?;
                category_ids.push(id);
            }

            let post = Post {
                title,
                description,
                categories: category_ids,
                ..Post::default()
            };
            let id = client.new_post(&post, publish).map_err(map_client_error)?;
            println!("Пост создан: id={id}");
        }
        Command::Edit {
            id,
            title,
            content,
            publish,
        } => {
            // getPost отдаёт только имена рубрик, id берём из getPostCategories
            let current = client.get_post(id).map_err(map_client_error)?;
            let assigned = collect(client.get_post_categories(id))?;
            let post = Post {
                title,
                description: content.unwrap_or_else(|| current.description.clone()),
                categories: primary_first(assigned),
                ..current
            };
            client
                .edit_post(id, &post, publish)
                .map_err(map_client_error)?;
            println!("Пост обновлён: id={id}");
        }
        Command::Publish { id } => {
            let published = client.publish_post(id).map_err(map_client_error)?;
            println!("Пост опубликован: id={id} ({published})");
        }
        Command::Delete { id } => {
            let deleted = client.delete_post(id).map_err(map_client_error)?;
            println!("Пост удалён: id={id} ({deleted})");
        }
        Command::Trackbacks { id } => {
            let pings = client.get_trackback_pings(id).map_err(map_client_error)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pings)?);
            } else {
                for ping in &pings {
                    println!("- {} <{}> from {}", ping.title, ping.url, ping.ip);
                }
            }
        }
        Command::Pingbacks { url } => {
            let sources = client.get_pingbacks(&url).map_err(map_client_error)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sources)?);
            } else {
                sources.iter().for_each(|source| println!("{source}"));
            }
        }
    }

    Ok(())
}

fn collect<T, I>(batch: wp_client::ClientResult<I>) -> Result<Vec<T>>
where
    I: Iterator<Item = wp_client::ClientResult<T>>,
{
    batch
        .map_err(map_client_error)?
        .collect::<wp_client::ClientResult<Vec<T>>>()
        .map_err(map_client_error)
}

/// Id рубрик поста, основная первой: `set_post_categories` делает основной первую.
fn primary_first(mut categories: Vec<Category>) -> Vec<i64> {
    categories.sort_by_key(|category| !category.is_primary);
    categories.into_iter().map(|category| category.id).collect()
}

fn embed_image(content: &str, src: &str) -> String {
    format!("{content}\n\n<img src=\"{src}\" />\n")
}

fn map_client_error(err: ClientError) -> anyhow::Error {
    let message = match err {
        ClientError::WordPress(err) if err.is_fault() => {
            format!("сервер вернул ошибку {}: {}", err.code, err.message)
        }
        ClientError::WordPress(err) => format!("операция отклонена: {}", err.message),
        ClientError::Transport(err) => format!("ошибка соединения: {err}"),
        ClientError::Decode(err) => format!("неожиданный ответ сервера: {err}"),
        ClientError::Io(err) => format!("ошибка чтения файла: {err}"),
        ClientError::NoPosts => "в блоге нет постов".to_string(),
    };
    anyhow!(message)
}

fn print_one<T: Serialize + Display>(json: bool, item: &T) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{item}");
    }
    Ok(())
}

fn print_all<T: Serialize + Display>(json: bool, items: &[T]) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    println!("Всего: {}", items.len());
    for item in items {
        println!("- {item}");
    }
    Ok(())
}
