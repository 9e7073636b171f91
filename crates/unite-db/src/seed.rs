use anyhow::Result;
use rusqlite::Transaction;

pub const SEED_ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";
pub const SEED_ADMIN_EMAIL: &str = "teste@teste.com.br";

/// Demo accounts next to the administrator: (name, email, role, sector).
const USERS: &[(&str, &str, &str, &str)] = &[
    ("João Silva", "joao@unite.com.br", "USUARIO_COMUM", "Marketing"),
    ("Maria Souza", "maria@unite.com.br", "USUARIO_COMUM", "Financeiro"),
    ("Pedro Oliveira", "pedro@unite.com.br", "ADMINISTRADOR", "Recursos Humanos"),
];

/// (name, description, sector, slug), four per sector.
const AGENTS: &[(&str, &str, &str, &str)] = &[
    ("Estrategista de Campanhas", "Planejamento e otimização de campanhas de marketing", "Marketing", "estrategista-campanhas"),
    ("Social Media", "Geração de conteúdo e estratégias para redes sociais", "Marketing", "social-media"),
    ("Copywriting Rápido", "Textos persuasivos para campanhas e materiais", "Marketing", "copywriting-rapido"),
    ("Análise de Concorrência", "Benchmarking e análise competitiva", "Marketing", "analise-concorrencia"),
    ("Relatórios Financeiros", "Geração e análise de relatórios financeiros", "Financeiro", "relatorios-financeiros"),
    ("Planejamento Orçamentário", "Auxílio na criação e gestão de orçamentos", "Financeiro", "planejamento-orcamentario"),
    ("Fluxo de Caixa", "Análise e projeções de fluxo de caixa", "Financeiro", "fluxo-caixa"),
    ("Gestão de Custos", "Estratégias para otimização de custos", "Financeiro", "gestao-custos"),
    ("Recrutador Virtual", "Auxílio em processos seletivos e triagem de candidatos", "Recursos Humanos", "recrutador-virtual"),
    ("Clima Organizacional", "Análise e estratégias para melhorar o ambiente de trabalho", "Recursos Humanos", "clima-organizacional"),
    ("Plano de Treinamento", "Criação de planos de desenvolvimento para colaboradores", "Recursos Humanos", "plano-treinamento"),
    ("Gestor de Benefícios", "Análise e sugestões para pacotes de benefícios", "Recursos Humanos", "gestor-beneficios"),
    ("Projetos", "Gestão e acompanhamento de projetos", "Operações", "projetos"),
    ("Qualidade", "Processos de qualidade e melhoria contínua", "Operações", "qualidade"),
    ("Checklist Diário", "Verificações diárias de operações", "Operações", "checklist-diario"),
    ("Distribuidor de Tarefas", "Organização e distribuição de tarefas na equipe", "Operações", "distribuidor-tarefas"),
    ("Previsão de Vendas", "Análise e projeções de vendas", "Vendas", "previsao-vendas"),
    ("Análise de Leads", "Qualificação e estratégias para leads", "Vendas", "analise-leads"),
    ("Script de Vendas", "Criação de scripts persuasivos", "Vendas", "script-vendas"),
    ("CRM Helper", "Assistência para gestão de relacionamento com clientes", "Vendas", "crm-helper"),
    ("Suporte Técnico", "Auxílio na resolução de problemas técnicos", "Tecnologia", "suporte-tecnico"),
    ("Documentação", "Criação e gestão de documentação técnica", "Tecnologia", "documentacao"),
    ("Gerador de Testes", "Criação de casos de teste para software", "Tecnologia", "gerador-testes"),
    ("Incidentes", "Gestão e resolução de incidentes", "Tecnologia", "incidentes"),
];

/// Insert the initial administrator, the demo users and the agent catalogue.
/// Agent ids are stable so external links survive a fresh install.
pub(crate) fn run(tx: &Transaction<'_>) -> Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO users (id, name, email, role, sector)
         VALUES (?1, 'Administrador Inicial', ?2, 'ADMINISTRADOR_GERAL', 'Tecnologia')",
        (SEED_ADMIN_ID, SEED_ADMIN_EMAIL),
    )?;

    let mut stmt =
        tx.prepare("INSERT OR IGNORE INTO users (id, name, email, role, sector) VALUES (?1, ?2, ?3, ?4, ?5)")?;
    for (i, (name, email, role, sector)) in USERS.iter().enumerate() {
        let id = format!("00000000-0000-0000-0000-{:012}", i + 2);
        stmt.execute(rusqlite::params![id, name, email, role, sector])?;
    }

    let mut stmt = tx.prepare(
        "INSERT OR IGNORE INTO agents (id, name, description, sector, slug) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (i, (name, description, sector, slug)) in AGENTS.iter().enumerate() {
        let id = format!("00000000-0000-0000-0001-{:012}", i + 1);
        stmt.execute(rusqlite::params![id, name, description, sector, slug])?;
    }

    Ok(())
}
