use crate::api::CrmApi;
use crate::auth::password::TEST_COST;
use crate::auth::sessions::{create_session, SESSION_COOKIE};
use crate::config::{Backend, Config};
use crate::db::connection::Database;
use crate::db::SqliteCrm;
use crate::domain::lead::fixtures::lead;
use crate::domain::{
    Business, BusinessStatus, Development, LeadSource, NewBusiness, Role, Team, User,
};
use crate::state::AppState;
use astra::{Body, Response};
use http::{Method, Request};
use std::io::Read;
use tempfile::TempDir;

pub const PASSWORD: &str = "secret";
pub const PUSH_TOKEN: &str = "push-token";

/// Fresh database in its own temp dir, with the bundled schema applied.
/// Keep the `TempDir` alive for as long as the database is used.
pub fn init_test_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("No temp dir: {e}"));
    let path = dir.path().join("test_db.sqlite");
    let db = Database::new(path.to_string_lossy().into_owned());

    db.init_embedded()
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    (dir, db)
}

/// App state over the local store, seeded with a small directory:
/// an admin, a team leader with two brokers and one broker of another team.
pub struct TestApp {
    _dir: TempDir,
    pub state: AppState,
    pub crm: SqliteCrm,
}

fn person(id: &str, role: Role, team_id: Option<&str>) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        role,
        active: true,
        team_id: team_id.map(str::to_string),
    }
}

impl TestApp {
    pub fn new() -> Self {
        let (dir, db) = init_test_db();
        let crm = SqliteCrm::new(db.clone()).with_password_cost(TEST_COST);

        crm.add_team(&Team {
            id: "team-a".into(),
            name: "Team A".into(),
            leader_id: "leader".into(),
        })
        .unwrap();
        crm.add_team(&Team {
            id: "team-b".into(),
            name: "Team B".into(),
            leader_id: "nobody".into(),
        })
        .unwrap();
        for user in [
            person("admin", Role::Admin, None),
            person("leader", Role::TeamLeader, Some("team-a")),
            person("broker-1", Role::Broker, Some("team-a")),
            person("broker-2", Role::Broker, Some("team-b")),
        ] {
            crm.add_user(&user, PASSWORD).unwrap();
        }
        crm.add_development(&Development {
            id: "dev-1".into(),
            name: "Jardim Europa".into(),
            location: String::new(),
            description: String::new(),
        })
        .unwrap();

        let mut config = Config::from_lookup(|_| None).unwrap();
        config.backend = Backend::Rest {
            base_url: "http://crm.invalid".into(),
            token: Some(PUSH_TOKEN.into()),
        };

        let state = AppState::new(config, db, Box::new(crm.clone()));
        Self {
            _dir: dir,
            state,
            crm,
        }
    }

    /// Cookie header value for a signed-in user.
    pub fn cookie_for(&self, user_id: &str) -> String {
        let token = self
            .state
            .db
            .with_conn(|conn| create_session(conn, user_id, chrono::Utc::now().timestamp()))
            .unwrap();
        format!("{SESSION_COOKIE}={token}")
    }

    /// A lead and one business for it in `dev-1`.
    pub fn seed_business(
        &self,
        lead_id: &str,
        name: &str,
        broker: &str,
        status: BusinessStatus,
    ) -> Business {
        let mut l = lead(lead_id, name);
        l.broker_id = broker.to_string();
        l.source = Some(LeadSource::Website);
        self.crm.add_lead(&l).unwrap();
        self.crm
            .create_business(&NewBusiness {
                lead_id: lead_id.to_string(),
                development_id: "dev-1".into(),
                broker_id: broker.to_string(),
                source: LeadSource::Website,
                status,
                notes: None,
            })
            .unwrap()
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::from(form.as_bytes().to_vec())).unwrap()
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn location(resp: &Response) -> &str {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
