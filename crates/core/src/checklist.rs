//! Checklist progress and built-in templates.

use serde::Serialize;

use crate::error::CoreError;

/// Completion summary of a checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistProgress {
    pub done: i64,
    pub total: i64,
    /// Rounded down; 0 for an empty checklist.
    pub percent: i64,
}

pub fn progress(done: i64, total: i64) -> ChecklistProgress {
    let percent = if total <= 0 { 0 } else { done * 100 / total };
    ChecklistProgress {
        done,
        total,
        percent,
    }
}

/// Names of the built-in templates.
pub const TEMPLATE_NAMES: &[&str] = &["onboarding", "campaign_launch", "monthly_review"];

/// Item labels seeded by a template.
pub fn template_items(name: &str) -> Result<&'static [&'static str], CoreError> {
    match name {
        "onboarding" => Ok(&[
            "Coletar acessos do Gerenciador de Anúncios",
            "Instalar pixel e eventos de conversão",
            "Definir metas de CPA e ROAS",
            "Mapear público-alvo e personas",
            "Agendar reunião de kickoff",
        ]),
        "campaign_launch" => Ok(&[
            "Revisar criativos e copies",
            "Configurar públicos e exclusões",
            "Validar URLs com UTMs",
            "Definir orçamento diário",
            "Publicar campanhas",
            "Checar entrega após 24h",
        ]),
        "monthly_review" => Ok(&[
            "Exportar métricas do período",
            "Comparar resultados com metas",
            "Pausar conjuntos com baixo desempenho",
            "Gerar relatório para o cliente",
            "Planejar testes do próximo mês",
        ]),
        other => Err(CoreError::Validation(format!(
            "Unknown checklist template '{other}'. Must be one of: {TEMPLATE_NAMES:?}"
        ))),
    }
}
