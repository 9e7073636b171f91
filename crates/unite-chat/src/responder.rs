//! Canned agent replies.
//!
//! A reply is a per-sector base sentence, reshaped by the first rule in
//! [`RULES`] whose trigger words appear in the message. Matching is a
//! case-insensitive substring check. When no rule matches, the base is
//! followed by an "I will analyze" line quoting the message.

use unite_types::models::Sector;

/// One entry of the ordered rule table.
pub struct Rule {
    name: &'static str,
    triggers: &'static [&'static str],
    build: fn(base: &str) -> String,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `lowered` must already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t))
    }

    pub fn build(&self, base: &str) -> String {
        (self.build)(base)
    }
}

/// Evaluated in order, first match wins.
pub const RULES: &[Rule] = &[
    Rule {
        name: "greeting",
        triggers: &["olá", "oi"],
        build: |base| format!("Olá! {}", base),
    },
    Rule {
        name: "help",
        triggers: &["ajuda"],
        build: |base| format!("Claro, estou aqui para ajudar! {} Em que posso ser útil hoje?", base),
    },
    Rule {
        name: "thanks",
        triggers: &["obrigado"],
        build: |_| "De nada! Estou sempre à disposição para ajudar. Tem mais alguma questão?".to_string(),
    },
];

fn topic(sector: Option<Sector>) -> &'static str {
    match sector {
        Some(Sector::Marketing) => "posso ajudar com estratégias de marketing, campanhas e análise de concorrência.",
        Some(Sector::Financeiro) => "posso ajudar com relatórios financeiros, orçamentos e análise de fluxo de caixa.",
        Some(Sector::RecursosHumanos) => {
            "posso ajudar com processos de recrutamento, clima organizacional e planos de treinamento."
        }
        Some(Sector::Operacoes) => "posso ajudar com gestão de projetos, controle de qualidade e alocação de tarefas.",
        Some(Sector::Vendas) => "posso ajudar com previsões de vendas, análise de leads e estratégias de vendas.",
        Some(Sector::Tecnologia) => "posso ajudar com suporte técnico, documentação e resolução de incidentes.",
        None => "posso ajudar a responder suas perguntas e fornecer assistência.",
    }
}

/// Sector sentence every reply is built from.
pub fn base_template(sector: Option<Sector>) -> String {
    let name = sector.map(|s| s.to_string()).unwrap_or_else(|| "desconhecido".to_string());
    format!("Como assistente do setor de {}, {}", name, topic(sector))
}

/// The rule that fires for `message`, if any.
pub fn select_rule(message: &str) -> Option<&'static Rule> {
    let lowered = message.to_lowercase();
    RULES.iter().find(|rule| rule.matches(&lowered))
}

pub fn synthesize(sector: Option<Sector>, message: &str) -> String {
    let base = base_template(sector);
    match select_rule(message) {
        Some(rule) => rule.build(&base),
        None => format!(
            "{} Vou analisar sua solicitação: \"{}\" e voltar com uma resposta apropriada.",
            base, message
        ),
    }
}
