//! Embedded default records
//!
//! The last step of every chain. These lists are used only when the cache and
//! every remote step have failed, and they are never written to the cache.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::panel::PanelId;
use crate::record::Record;

fn record(value: Value) -> Record {
    Record::try_from(value).unwrap_or_default()
}

/// Default records for a panel
#[must_use]
pub fn for_panel(panel: PanelId) -> Vec<Record> {
    match panel {
        PanelId::Epics => epics(),
        PanelId::Cron => cron_jobs(),
        PanelId::News => news(),
        PanelId::System => system(),
    }
}

/// Sample epics, stamped as updated now
#[must_use]
pub fn epics() -> Vec<Record> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    vec![
        record(json!({
            "title": "Bob Proctor Transcription Project",
            "description": "Complete transcription of Bob Proctor's 'You Were Born Rich' series with detailed teaching materials",
            "progress": 95,
            "status": "in-progress",
            "tasksCompleted": 19,
            "totalTasks": 20,
            "priority": "high",
            "owner": "Personal Development Team",
            "dueDate": "Feb 15, 2026",
            "persistentMemory": true,
            "memoryLocation": "memory/bob_proctor_transcription.json",
            "lastUpdated": now,
        })),
        record(json!({
            "title": "Moltbot Mini App v3.2.7",
            "description": "Enhanced dashboard with real-time data connections and improved UI/UX",
            "progress": 100,
            "status": "completed",
            "tasksCompleted": 28,
            "totalTasks": 28,
            "priority": "high",
            "owner": "Development Team",
            "dueDate": "Jan 29, 2026",
            "persistentMemory": true,
            "memoryLocation": "memory/moltbot_mini_app_v3_2_7.json",
            "lastUpdated": now,
        })),
        record(json!({
            "title": "Property Monitoring Agent",
            "description": "Automated system to monitor idealista.pt for new property listings matching criteria",
            "progress": 75,
            "status": "in-progress",
            "tasksCompleted": 15,
            "totalTasks": 20,
            "priority": "medium",
            "owner": "Real Estate Team",
            "dueDate": "Mar 1, 2026",
            "persistentMemory": true,
            "memoryLocation": "memory/property_monitoring_agent.json",
            "lastUpdated": now,
        })),
        record(json!({
            "title": "Security Enhancement Protocol",
            "description": "Implement additional security measures for API access and data protection",
            "progress": 40,
            "status": "in-progress",
            "tasksCompleted": 8,
            "totalTasks": 20,
            "priority": "high",
            "owner": "Security Team",
            "dueDate": "Feb 28, 2026",
            "persistentMemory": true,
            "memoryLocation": "memory/security_enhancement.json",
            "lastUpdated": now,
        })),
    ]
}

/// Sample headlines
#[must_use]
pub fn news() -> Vec<Record> {
    vec![
        record(json!({
            "title": "Portugal mantém-se como destino turístico em alta",
            "description": "Dados revelam aumento de 15% nas reservas para o próximo verão.",
            "date": "29 Jan 2026, 10:30",
            "link": "https://rtp.pt/noticias",
            "image": "https://via.placeholder.com/300x150/4a90e2/ffffff?text=Turismo",
        })),
        record(json!({
            "title": "Novo centro tecnológico inaugurado em Lisboa",
            "description": "Investimento de 50 milhões de euros promete criar 1000 novos empregos.",
            "date": "29 Jan 2026, 09:15",
            "link": "https://rtp.pt/noticias",
            "image": "https://via.placeholder.com/300x150/50c878/ffffff?text=Tecnologia",
        })),
        record(json!({
            "title": "Campeões nacionais de futebol definidos",
            "description": "Final emocionante termina com vitória por 2-1 após prolongamento.",
            "date": "28 Jan 2026, 21:45",
            "link": "https://rtp.pt/noticias",
            "image": "https://via.placeholder.com/300x150/ff6b6b/ffffff?text=Desporto",
        })),
        record(json!({
            "title": "Cimeira europeia sobre clima termina com compromissos",
            "description": "Líderes europeus concordam em aumentar metas de redução de emissões.",
            "date": "28 Jan 2026, 18:20",
            "link": "https://rtp.pt/noticias",
            "image": "https://via.placeholder.com/300x150/f39c12/ffffff?text=Clima",
        })),
        record(json!({
            "title": "Mercado imobiliário mostra sinais de estabilização",
            "description": "Preços registam primeira descida em dois anos na região de Lisboa.",
            "date": "28 Jan 2026, 15:10",
            "link": "https://rtp.pt/noticias",
            "image": "https://via.placeholder.com/300x150/9b59b6/ffffff?text=Im%C3%B3veis",
        })),
    ]
}

/// Sample scheduled jobs
#[must_use]
pub fn cron_jobs() -> Vec<Record> {
    vec![
        record(json!({
            "id": "weather_update",
            "name": "Weather Data Update",
            "schedule": "Every 15 minutes",
            "lastRun": "2026-01-29 15:45:22",
            "status": "success",
            "nextRun": "2026-01-29 15:59:59",
            "executions": 1247,
        })),
        record(json!({
            "id": "news_refresh",
            "name": "News Feed Refresh",
            "schedule": "Every 30 minutes",
            "lastRun": "2026-01-29 15:30:15",
            "status": "success",
            "nextRun": "2026-01-29 16:00:00",
            "executions": 832,
        })),
        record(json!({
            "id": "memory_cleanup",
            "name": "Memory Cleanup",
            "schedule": "Daily at 02:00",
            "lastRun": "2026-01-29 02:00:05",
            "status": "success",
            "nextRun": "2026-01-30 02:00:00",
            "executions": 29,
        })),
        record(json!({
            "id": "backup_system",
            "name": "System Backup",
            "schedule": "Weekly on Sunday 01:00",
            "lastRun": "2026-01-25 01:00:12",
            "status": "success",
            "nextRun": "2026-02-01 01:00:00",
            "executions": 4,
        })),
        record(json!({
            "id": "heartbeat_check",
            "name": "Heartbeat Monitor",
            "schedule": "Every 5 minutes",
            "lastRun": "2026-01-29 15:55:03",
            "status": "success",
            "nextRun": "2026-01-29 16:00:00",
            "executions": 3741,
        })),
    ]
}

/// Sample system snapshot, as a single record stamped now
#[must_use]
pub fn system() -> Vec<Record> {
    vec![record(json!({
        "status": "operational",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "uptime": "7 days, 3 hours, 24 minutes",
        "platform": "macOS (Apple Silicon)",
        "memory": { "used": 2.4, "total": 16.0, "percent": 15 },
        "cpu": { "usage": 23, "cores": 8, "model": "Apple M2 Pro" },
        "disk": { "used": 234, "total": 512, "percent": 46 },
        "network": { "download": "45.2 Mbps", "upload": "12.8 Mbps", "status": "connected" },
        "services": [
            { "name": "Moltbot Core", "status": "running", "uptime": "7 days" },
            { "name": "Weather Proxy", "status": "running", "uptime": "7 days" },
            { "name": "News Aggregator", "status": "running", "uptime": "7 days" },
            { "name": "Memory Manager", "status": "running", "uptime": "7 days" },
            { "name": "Task Scheduler", "status": "running", "uptime": "7 days" },
            { "name": "Security Monitor", "status": "running", "uptime": "7 days" }
        ],
    }))]
}
