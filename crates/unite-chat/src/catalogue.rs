use strum::IntoEnumIterator;
use tracing::info;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use uuid::Uuid;

use unite_types::api::{CreateAgentRequest, UpdateAgentRequest};
use unite_types::models::{Agent, Sector};

use crate::error::{ChatError, Result};
use crate::repository::ChatRepository;

/// URL-safe slug: accents folded to ASCII, lowercased, and every run of
/// characters outside `[a-z0-9_]` collapsed into a single `-`.
pub fn slugify(raw: &str) -> String {
    let folded: String = raw.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let mut slug = String::with_capacity(folded.len());
    for c in folded.chars().map(|c| c.to_ascii_lowercase()) {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn normalize_slug(raw: &str) -> Result<String> {
    let slug = slugify(raw);
    if slug.is_empty() {
        return Err(ChatError::InvalidInput(format!("'{}' has no characters usable in a slug", raw)));
    }
    Ok(slug)
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ChatError::InvalidInput(format!("{} is empty", field)));
    }
    Ok(())
}

pub fn list_agents<R: ChatRepository + ?Sized>(repo: &R, sector: Option<Sector>) -> Result<Vec<Agent>> {
    Ok(match sector {
        Some(sector) => repo.list_agents_by_sector(sector)?,
        None => repo.list_agents()?,
    })
}

/// Sectors that have at least one agent, in canonical order.
pub fn list_sectors<R: ChatRepository + ?Sized>(repo: &R) -> Result<Vec<Sector>> {
    let agents = repo.list_agents()?;
    Ok(Sector::iter()
        .filter(|s| agents.iter().any(|a| a.sector == *s))
        .collect())
}

pub fn get_agent_by_slug<R: ChatRepository + ?Sized>(repo: &R, slug: &str) -> Result<Agent> {
    repo.get_agent_by_slug(slug)?
        .ok_or_else(|| ChatError::not_found("agent", slug))
}

pub fn create_agent<R: ChatRepository + ?Sized>(repo: &R, req: CreateAgentRequest) -> Result<Agent> {
    require_text("name", &req.name)?;
    let slug = match req.slug.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(slug) => normalize_slug(slug)?,
        None => normalize_slug(&req.name)?,
    };

    if repo.get_agent_by_slug(&slug)?.is_some() {
        return Err(ChatError::Conflict(format!("slug '{}' is taken", slug)));
    }

    let agent = Agent {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        description: req.description,
        sector: req.sector,
        slug,
        avatar: req.avatar,
    };
    repo.insert_agent(&agent).map_err(|e| store_conflict(repo, e, "slug is taken"))?;

    info!("Created agent '{}' ({})", agent.slug, agent.sector);
    Ok(agent)
}

/// Partial update. Once conversations reference the agent, its slug and
/// sector are frozen; name, description and avatar stay editable.
pub fn update_agent<R: ChatRepository + ?Sized>(repo: &R, id: Uuid, req: UpdateAgentRequest) -> Result<Agent> {
    let mut agent = repo.get_agent(id)?.ok_or_else(|| ChatError::not_found("agent", id))?;

    let slug = req.slug.as_deref().map(normalize_slug).transpose()?;
    let slug_changes = slug.as_ref().is_some_and(|s| *s != agent.slug);
    let sector_changes = req.sector.is_some_and(|s| s != agent.sector);

    if (slug_changes || sector_changes) && repo.count_conversations_for_agent(id)? > 0 {
        return Err(ChatError::Conflict(format!(
            "agent '{}' has conversations; slug and sector are frozen",
            agent.slug
        )));
    }

    if let Some(slug) = slug.filter(|_| slug_changes) {
        if repo.get_agent_by_slug(&slug)?.is_some() {
            return Err(ChatError::Conflict(format!("slug '{}' is taken", slug)));
        }
        agent.slug = slug;
    }
    if let Some(name) = req.name {
        require_text("name", &name)?;
        agent.name = name.trim().to_string();
    }
    if let Some(description) = req.description {
        agent.description = description;
    }
    if let Some(sector) = req.sector {
        agent.sector = sector;
    }
    if let Some(avatar) = req.avatar {
        agent.avatar = Some(avatar).filter(|a| !a.is_empty());
    }

    if !repo.update_agent(&agent).map_err(|e| store_conflict(repo, e, "slug is taken"))? {
        return Err(ChatError::not_found("agent", id));
    }
    info!("Updated agent '{}'", agent.slug);
    Ok(agent)
}

/// Agents referenced by a conversation cannot be deleted.
pub fn delete_agent<R: ChatRepository + ?Sized>(repo: &R, id: Uuid) -> Result<()> {
    let agent = repo.get_agent(id)?.ok_or_else(|| ChatError::not_found("agent", id))?;
    let conversations = repo.count_conversations_for_agent(id)?;
    if conversations > 0 {
        return Err(ChatError::Conflict(format!(
            "agent '{}' is referenced by {} conversation(s)",
            agent.slug, conversations
        )));
    }

    // a send may land between the count and the delete; the store refuses then
    let deleted = repo.delete_agent(id).map_err(|e| {
        store_conflict(repo, e, &format!("agent '{}' is referenced by conversations", agent.slug))
    })?;
    if !deleted {
        return Err(ChatError::not_found("agent", id));
    }
    info!("Deleted agent '{}'", agent.slug);
    Ok(())
}

pub(crate) fn store_conflict<R: ChatRepository + ?Sized>(repo: &R, err: anyhow::Error, conflict: &str) -> ChatError {
    if repo.is_conflict(&err) {
        ChatError::Conflict(conflict.to_string())
    } else {
        ChatError::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::send_to_agent;
    use crate::test_support::{seeded_memory, user_id};

    fn request(name: &str, slug: Option<&str>) -> CreateAgentRequest {
        CreateAgentRequest {
            name: name.into(),
            description: "Resumo de reuniões".into(),
            sector: Sector::Operacoes,
            slug: slug.map(Into::into),
            avatar: None,
        }
    }

    #[test]
    fn slugify_lowercases_and_joins_words() {
        assert_eq!(slugify("Gerador de  Testes"), "gerador-de-testes");
        assert_eq!(slugify("  CRM\tHelper "), "crm-helper");
    }

    #[test]
    fn slugify_folds_accents_and_punctuation() {
        assert_eq!(slugify("Gestão de Ações"), "gestao-de-acoes");
        assert_eq!(slugify("C++ Helper"), "c-helper");
        assert_eq!(slugify("--Relatórios / Q3--"), "relatorios-q3");
        assert_eq!(slugify("fluxo_caixa"), "fluxo_caixa");
        assert!(slugify("Ação Rápida").is_ascii());
    }

    #[test]
    fn create_derives_slug_from_name() {
        let repo = seeded_memory();
        let agent = create_agent(&repo, request("Ata de Reunião", None)).unwrap();
        assert_eq!(agent.slug, "ata-de-reuniao");
        assert_eq!(get_agent_by_slug(&repo, "ata-de-reuniao").unwrap(), agent);
        assert!(agent.chat_url(Uuid::nil()).is_ascii());

        let helper = create_agent(&repo, request("C++ Helper", None)).unwrap();
        assert_eq!(helper.slug, "c-helper");
    }

    #[test]
    fn duplicate_or_empty_slug_is_rejected() {
        let repo = seeded_memory();
        let err = create_agent(&repo, request("Outro", Some("Social Media"))).unwrap_err();
        assert!(matches!(err, ChatError::Conflict(_)));

        let err = create_agent(&repo, request("Outro", Some("+++"))).unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
    }

    #[test]
    fn sectors_follow_canonical_order() {
        let repo = seeded_memory();
        assert_eq!(list_sectors(&repo).unwrap(), [Sector::Marketing, Sector::Tecnologia]);
        assert_eq!(list_agents(&repo, Some(Sector::Tecnologia)).unwrap().len(), 2);
    }

    #[test]
    fn referenced_agent_is_frozen() {
        let repo = seeded_memory();
        send_to_agent(&repo, user_id(), "incidentes", None, "oi").unwrap();
        let agent = get_agent_by_slug(&repo, "incidentes").unwrap();

        let err = update_agent(
            &repo,
            agent.id,
            UpdateAgentRequest {
                slug: Some("incidentes-v2".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ChatError::Conflict(_)));
        assert!(matches!(delete_agent(&repo, agent.id).unwrap_err(), ChatError::Conflict(_)));

        let renamed = update_agent(
            &repo,
            agent.id,
            UpdateAgentRequest {
                name: Some("Central de Incidentes".into()),
                slug: Some("incidentes".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(renamed.name, "Central de Incidentes");
        assert_eq!(renamed.slug, "incidentes");
    }

    #[test]
    fn store_refusal_on_delete_is_a_conflict() {
        // the conversation appears after the reference count was taken
        let repo = seeded_memory();
        send_to_agent(&repo, user_id(), "incidentes", None, "oi").unwrap();
        let agent = get_agent_by_slug(&repo, "incidentes").unwrap();
        let err = repo.delete_agent(agent.id).unwrap_err();
        assert!(matches!(store_conflict(&repo, err, "referenced"), ChatError::Conflict(_)));

        let db = unite_db::Database::open_in_memory().unwrap();
        let admin = unite_db::SEED_ADMIN_ID.parse().unwrap();
        send_to_agent(&db, admin, "suporte-tecnico", None, "oi").unwrap();
        let agent = get_agent_by_slug(&db, "suporte-tecnico").unwrap();
        let err = db.delete_agent(agent.id).unwrap_err();
        assert!(matches!(store_conflict(&db, err, "referenced"), ChatError::Conflict(_)));
        assert!(matches!(
            store_conflict(&db, anyhow::anyhow!("disk I/O error"), "referenced"),
            ChatError::Storage(_)
        ));
    }

    #[test]
    fn unreferenced_agent_can_move_and_be_deleted() {
        let repo = seeded_memory();
        let agent = get_agent_by_slug(&repo, "social-media").unwrap();
        let moved = update_agent(
            &repo,
            agent.id,
            UpdateAgentRequest {
                sector: Some(Sector::Vendas),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(moved.sector, Sector::Vendas);

        delete_agent(&repo, agent.id).unwrap();
        assert!(matches!(
            get_agent_by_slug(&repo, "social-media").unwrap_err(),
            ChatError::NotFound { .. }
        ));
    }
}
