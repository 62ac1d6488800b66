use clap::Subcommand;
use qa_client::{
    ApiClient, BreadcrumbTrail, ClientError, LabelCache, LabelResolver, RequestAction, Role,
    UserProfile,
};
use serde_json::{json, Value};
use tracing::info;

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and persist the token pair
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// GET any API path, e.g. `/academic-years/`
    Get { path: String },
    /// List standards, optionally for one academic year
    Standards {
        #[arg(long)]
        year: Option<String>,
    },
    /// List access requests
    Requests {
        /// Only the signed-in user's pending requests
        #[arg(long)]
        pending: bool,
    },
    /// List users, optionally only those holding one role
    Users {
        /// admin, supervisor, professor or ta
        #[arg(long)]
        role: Option<Role>,
    },
    Approve { id: String },
    Reject { id: String },
    Cancel { id: String },
    /// Print the breadcrumb trail for a dashboard path
    Breadcrumb {
        path: String,
        #[arg(long)]
        year: Option<String>,
    },
}

pub async fn run(client: &ApiClient, command: Command) -> Result<Value, ClientError> {
    match command {
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            Ok(profile_summary(&user))
        }
        Command::Logout => {
            client.logout();
            info!("Logged out");
            Ok(json!({ "logged_out": true }))
        }
        Command::Whoami => match client.restore().await? {
            Some(user) => Ok(profile_summary(&user)),
            None => Err(ClientError::unauthenticated()),
        },
        command => {
            client.session().rehydrate()?;
            run_authenticated(client, command).await
        }
    }
}

async fn run_authenticated(client: &ApiClient, command: Command) -> Result<Value, ClientError> {
    match command {
        Command::Get { path } => client.get_json(&normalize_path(&path)).await,
        Command::Standards { year } => {
            let standards = client.standards();
            let items = match year {
                Some(year) => standards.for_year(&year).await?,
                None => standards.list(&[]).await?,
            };
            Ok(Value::Array(items))
        }
        Command::Requests { pending } => {
            let requests = client.access_requests();
            let items = if pending {
                let user = client.fetch_current_user().await?;
                requests.pending_for(&id_string(&user.id)).await?
            } else {
                requests.list(&[]).await?
            };
            Ok(Value::Array(items))
        }
        Command::Users { role } => {
            let users = client.users();
            let items = match role {
                Some(role) => users.by_role(role).await?,
                None => users.list(&[]).await?,
            };
            Ok(Value::Array(items))
        }
        Command::Approve { id } => client.access_requests().act(&id, RequestAction::Approve).await,
        Command::Reject { id } => client.access_requests().act(&id, RequestAction::Reject).await,
        Command::Cancel { id } => client.access_requests().cancel(&id).await,
        Command::Breadcrumb { path, year } => {
            let cache = LabelCache::new(client.config().label_cache_capacity);
            let trail =
                BreadcrumbTrail::build(&path, year.as_deref(), LabelResolver::new(&cache, client))
                    .await;
            let crumbs: Vec<Value> = trail
                .crumbs()
                .iter()
                .map(|c| json!({ "label": c.display_label(), "href": c.href }))
                .collect();
            Ok(json!({ "text": trail.to_string(), "crumbs": crumbs }))
        }
        Command::Login { .. } | Command::Logout | Command::Whoami => {
            Err(ClientError::config("command does not need a session"))
        }
    }
}

fn profile_summary(user: &UserProfile) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "name": user.display_name(),
        "role": user.role,
        "is_admin": user.is_admin(),
    })
}

/// Accept `standards`, `/standards` or `/standards/`; API paths end with `/`.
fn normalize_path(raw: &str) -> String {
    let (path, query) = match raw.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (raw, None),
    };
    let mut normalized = format!("/{}", path.trim_matches('/'));
    if normalized.len() > 1 {
        normalized.push('/');
    }
    if let Some(query) = query {
        normalized.push('?');
        normalized.push_str(query);
    }
    normalized
}

/// User ids come back as numbers or strings depending on the deployment.
fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    #[test]
    fn paths_are_normalized() {
        assert_eq!(normalize_path("standards"), "/standards/");
        assert_eq!(normalize_path("/standards"), "/standards/");
        assert_eq!(normalize_path("/academic-years/"), "/academic-years/");
        assert_eq!(
            normalize_path("courses?academic_year=y-1"),
            "/courses/?academic_year=y-1"
        );
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn role_flag_parses_case_insensitively() {
        let cli = TestCli::try_parse_from(["qa", "users", "--role", "supervisor"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Users {
                role: Some(Role::Supervisor)
            }
        ));

        assert!(TestCli::try_parse_from(["qa", "users", "--role", "dean"]).is_err());
    }

    #[test]
    fn profile_summary_flags_admins() {
        let user: UserProfile = serde_json::from_value(json!({
            "id": 7,
            "username": "qa.admin",
            "email": "admin@uni.test",
            "role": "ADMIN",
            "first_name": "Hala",
            "last_name": "Nasser"
        }))
        .unwrap();

        let summary = profile_summary(&user);
        assert_eq!(summary["is_admin"], true);
        assert_eq!(summary["role"], "ADMIN");
        assert_eq!(summary["name"], "Hala Nasser");

        let ta = UserProfile {
            role: Role::Ta,
            ..user
        };
        assert_eq!(profile_summary(&ta)["is_admin"], false);
    }

    #[test]
    fn ids_print_without_quotes() {
        assert_eq!(id_string(&json!(9)), "9");
        assert_eq!(id_string(&json!("u-9")), "u-9");
    }
}
