//! Database schema definitions
//!
//! Single source of truth for table structure. Parent/child integrity
//! (task.project_id, workspace_members.workspace_id, ...) is enforced at
//! the application layer; no foreign-key cascades are declared.

/// SQL to create the users table
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT,
    avatar_url TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the roles table
/// NULL limits mean unlimited
pub const CREATE_ROLES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS roles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    price_cents INTEGER NOT NULL DEFAULT 0,
    max_workspaces INTEGER,
    max_projects INTEGER,
    max_tasks INTEGER,
    can_sync INTEGER NOT NULL DEFAULT 0,
    can_reports INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the user_subscriptions table
/// One active subscription per user
pub const CREATE_USER_SUBSCRIPTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user_subscriptions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE,
    role_id TEXT NOT NULL,
    started_at TEXT NOT NULL,
    expires_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the subscription_history table (append-only)
pub const CREATE_SUBSCRIPTION_HISTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS subscription_history (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    role_id TEXT NOT NULL,
    price_cents INTEGER NOT NULL,
    note TEXT,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create the workspaces table
pub const CREATE_WORKSPACES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS workspaces (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the workspace_members table
pub const CREATE_WORKSPACE_MEMBERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS workspace_members (
    id TEXT PRIMARY KEY,
    workspace_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'member',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(workspace_id, user_id)
)
"#;

/// SQL to create the projects table
pub const CREATE_PROJECTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    workspace_id TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    color TEXT,
    completion INTEGER NOT NULL DEFAULT 0,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the task_types table
/// workspace_id NULL means the type is personal to the user
pub const CREATE_TASK_TYPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS task_types (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    workspace_id TEXT,
    name TEXT NOT NULL,
    icon TEXT,
    is_default INTEGER NOT NULL DEFAULT 0,
    display_order INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the tasks table
pub const CREATE_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    parent_task_id TEXT,
    task_type_id TEXT,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'backlog',
    progress INTEGER NOT NULL DEFAULT 0,
    due_at TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the time_entries table
/// ended_at NULL marks a running timer
pub const CREATE_TIME_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS time_entries (
    id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    note TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the scheduled_events table
pub const CREATE_SCHEDULED_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS scheduled_events (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    task_id TEXT,
    title TEXT NOT NULL,
    starts_at TEXT NOT NULL,
    ends_at TEXT NOT NULL,
    external_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the points_ledger table (append-only, points signed)
pub const CREATE_POINTS_LEDGER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS points_ledger (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    task_id TEXT,
    time_entry_id TEXT,
    points INTEGER NOT NULL,
    reason TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create the daily_summaries table
pub const CREATE_DAILY_SUMMARIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS daily_summaries (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    date TEXT NOT NULL,
    tracked_seconds INTEGER NOT NULL DEFAULT 0,
    tasks_completed INTEGER NOT NULL DEFAULT 0,
    points INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(user_id, date)
)
"#;

/// SQL to create the user_preferences table (one row per user)
pub const CREATE_USER_PREFERENCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user_preferences (
    user_id TEXT PRIMARY KEY,
    timezone TEXT NOT NULL DEFAULT 'UTC',
    week_starts_on INTEGER NOT NULL DEFAULT 1,
    theme TEXT NOT NULL DEFAULT 'system',
    daily_goal_minutes INTEGER,
    notifications_enabled INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_subscription_history_user ON subscription_history(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_workspaces_owner ON workspaces(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_workspace_members_workspace ON workspace_members(workspace_id)",
    "CREATE INDEX IF NOT EXISTS idx_projects_workspace ON projects(workspace_id)",
    "CREATE INDEX IF NOT EXISTS idx_task_types_user ON task_types(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_parent ON tasks(parent_task_id)",
    "CREATE INDEX IF NOT EXISTS idx_time_entries_task ON time_entries(task_id)",
    "CREATE INDEX IF NOT EXISTS idx_time_entries_user ON time_entries(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_scheduled_events_user ON scheduled_events(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_scheduled_events_external ON scheduled_events(external_id)",
    "CREATE INDEX IF NOT EXISTS idx_points_ledger_user ON points_ledger(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_daily_summaries_user ON daily_summaries(user_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_USERS_TABLE,
        CREATE_ROLES_TABLE,
        CREATE_USER_SUBSCRIPTIONS_TABLE,
        CREATE_SUBSCRIPTION_HISTORY_TABLE,
        CREATE_WORKSPACES_TABLE,
        CREATE_WORKSPACE_MEMBERS_TABLE,
        CREATE_PROJECTS_TABLE,
        CREATE_TASK_TYPES_TABLE,
        CREATE_TASKS_TABLE,
        CREATE_TIME_ENTRIES_TABLE,
        CREATE_SCHEDULED_EVENTS_TABLE,
        CREATE_POINTS_LEDGER_TABLE,
        CREATE_DAILY_SUMMARIES_TABLE,
        CREATE_USER_PREFERENCES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
