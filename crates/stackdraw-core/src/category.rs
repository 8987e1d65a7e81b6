use serde::{Deserialize, Serialize};

/// Categorical type of a node, rendered as `data.type`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Frontend,
    Backend,
    Database,
    Api,
    Deployment,
    Custom,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Frontend,
        Category::Backend,
        Category::Database,
        Category::Api,
        Category::Deployment,
        Category::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Frontend => "frontend",
            Category::Backend => "backend",
            Category::Database => "database",
            Category::Api => "api",
            Category::Deployment => "deployment",
            Category::Custom => "custom",
        }
    }

    /// Parse a category name, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

pub struct CategoryRule {
    pub category: Category,
    pub keywords: &'static [&'static str],
}

/// Keyword rules evaluated top to bottom; the first rule with a matching keyword wins.
///
/// Keywords of four or more characters also match as a word prefix
/// ("postgres" matches "PostgreSQL"); shorter ones must match a whole word.
/// Keywords containing a space match anywhere in the label.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Deployment,
        keywords: &[
            "aws", "ec2", "ecs", "eks", "lambda", "gcp", "azure", "docker", "kubernetes", "k8s",
            "vercel", "netlify", "heroku", "fly.io", "render", "railway", "cloudflare", "nginx",
            "terraform", "deploy", "deployment", "hosting", "ci/cd", "github actions",
        ],
    },
    CategoryRule {
        category: Category::Database,
        keywords: &[
            "postgres", "mysql", "mariadb", "sqlite", "mongo", "redis", "dynamodb", "cassandra",
            "supabase", "firestore", "elasticsearch", "neo4j", "database", "db", "sql",
            "datastore", "s3",
        ],
    },
    CategoryRule {
        category: Category::Frontend,
        keywords: &[
            "react", "vue", "angular", "svelte", "next.js", "nextjs", "nuxt", "remix", "vite",
            "tailwind", "html", "css", "frontend", "ui", "spa", "web app", "mobile", "flutter",
            "swiftui",
        ],
    },
    CategoryRule {
        category: Category::Backend,
        keywords: &[
            "node", "node.js", "express", "nestjs", "flask", "django", "fastapi", "spring", "rails",
            "laravel", "phoenix", "actix", "axum", "gin", "backend", "server", "worker", "go",
            "golang", ".net",
        ],
    },
    CategoryRule {
        category: Category::Api,
        keywords: &[
            "api", "rest", "graphql", "grpc", "gateway", "webhook", "stripe", "auth0", "openai",
            "gemini", "twilio", "sendgrid", "oauth",
        ],
    },
];

/// Infer a category from a node label using [`CATEGORY_RULES`], defaulting to `Custom`.
pub fn infer_category(label: &str) -> Category {
    infer_with(CATEGORY_RULES, label)
}

pub fn infer_with(rules: &[CategoryRule], label: &str) -> Category {
    let lower = label.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ',' | '-' | '_' | ':' | '|'))
        .map(|w| w.trim_end_matches('.'))
        .filter(|w| !w.is_empty())
        .collect();

    rules
        .iter()
        .find(|rule| {
            rule.keywords.iter().any(|kw| {
                if kw.contains(' ') {
                    lower.contains(kw)
                } else {
                    words.iter().any(|w| keyword_matches(w, kw))
                }
            })
        })
        .map(|rule| rule.category)
        .unwrap_or(Category::Custom)
}

fn keyword_matches(word: &str, keyword: &str) -> bool {
    word == keyword || (keyword.len() >= 4 && word.starts_with(keyword))
}
