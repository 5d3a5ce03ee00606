// src/web/session.rs

use crate::{
    constants,
    workbench::{Connector, Workbench},
};
use axum::http::{HeaderMap, header::COOKIE};
use dashmap::DashMap;
use log::debug;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex as TokioMutex;
use uuid::Uuid;

pub type SharedWorkbench = Arc<TokioMutex<Workbench>>;

struct SessionEntry {
    workbench: SharedWorkbench,
    last_seen: Instant,
}

/// 按浏览器会话隔离的工作台集合。每个工作台由互斥锁保护，同一会话的动作依次执行。
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, SessionEntry>>,
    config_path: PathBuf,
    connector: Connector,
    idle_ttl: Duration,
    max_sessions: usize,
}

/// 本次请求对应的会话
pub struct Session {
    pub id: Uuid,
    pub workbench: SharedWorkbench,
    /// 需要通过 Set-Cookie 下发会话标识
    pub is_new: bool,
}

impl SessionStore {
    pub fn new(config_path: impl Into<PathBuf>, connector: Connector) -> Self {
        Self::with_limits(
            config_path,
            connector,
            constants::SESSION_IDLE_TTL,
            constants::MAX_SESSIONS,
        )
    }

    pub fn with_limits(
        config_path: impl Into<PathBuf>,
        connector: Connector,
        idle_ttl: Duration,
        max_sessions: usize,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            config_path: config_path.into(),
            connector,
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// 根据 Cookie 找到会话。没有 Cookie、或 Cookie 指向未知（已过期、服务重启前）的会话时，
    /// 分配一个服务端生成的新标识，不沿用客户端提供的值。
    pub fn resolve(&self, headers: &HeaderMap) -> Session {
        let now = Instant::now();
        self.evict_idle(now);

        if let Some(id) = session_id(headers)
            && let Some(mut entry) = self.sessions.get_mut(&id)
        {
            entry.last_seen = now;
            return Session {
                id,
                workbench: entry.workbench.clone(),
                is_new: false,
            };
        }

        self.evict_oldest_until(self.max_sessions - 1);
        let id = Uuid::new_v4();
        debug!("新建会话 {}", id);
        let workbench = Arc::new(TokioMutex::new(Workbench::new(
            self.config_path.clone(),
            self.connector.clone(),
        )));
        self.sessions.insert(
            id,
            SessionEntry {
                workbench: workbench.clone(),
                last_seen: now,
            },
        );
        Session {
            id,
            workbench,
            is_new: true,
        }
    }

    fn evict_idle(&self, now: Instant) {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!("回收 {} 个闲置会话", evicted);
        }
    }

    fn evict_oldest_until(&self, limit: usize) {
        while self.sessions.len() > limit {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.value().last_seen)
                .map(|entry| *entry.key());
            let Some(id) = oldest else { break };
            debug!("会话数已达上限，回收最久未活动的会话 {}", id);
            self.sessions.remove(&id);
        }
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    let prefix = format!("{}=", constants::SESSION_COOKIE);
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(prefix.as_str()))
        .find_map(|raw| Uuid::parse_str(raw.trim()).ok())
}

pub fn set_cookie_value(id: Uuid) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        constants::SESSION_COOKIE,
        id
    )
}
