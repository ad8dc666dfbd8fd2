//! Output formatters for ticket, user and statistics detail views

use owo_colors::OwoColorize;

use super::{format_priority_colored, format_status_colored, format_timestamp};
use crate::ai::AiSolution;
use crate::policy::Action;
use crate::session::Session;
use crate::stats::StatsSummary;
use crate::ticket::Ticket;
use crate::types::{ALL_STATUSES, TicketPriority};
use crate::user::User;

/// Ticket display formatters
pub struct TicketFormatter;

impl TicketFormatter {
    /// One line per ticket: id, status badge, priority and title
    pub fn format_line(ticket: &Ticket) -> String {
        format!(
            "{} {} {} {}",
            format!("#{:<6}", ticket.id).cyan(),
            format_status_colored(ticket.status),
            format_priority_colored(ticket.priority),
            ticket.display_title()
        )
    }

    pub fn format_detail(ticket: &Ticket, actions: &[Action]) -> String {
        let mut output = format!(
            "{} {}\n",
            format!("Chamado #{}", ticket.id).bold(),
            format_status_colored(ticket.status)
        );
        output.push_str(&format!("{}\n\n", ticket.display_title()));

        output.push_str(&format!("  Categoria:   {}\n", ticket.category));
        output.push_str(&format!(
            "  Prioridade:  {}\n",
            format_priority_colored(ticket.priority)
        ));
        output.push_str(&format!(
            "  Aberto por:  {} <{}>\n",
            ticket.opened_by_user.name, ticket.opened_by_user.email
        ));
        output.push_str(&format!(
            "  Aberto em:   {}\n",
            format_timestamp(ticket.opened_at)
        ));

        let milestones = [
            ("Aprovação", ticket.approved_or_rejected_at),
            ("Escalado em", ticket.escalated_at),
            ("Resolvido em", ticket.resolved_at),
        ];
        for (label, ts) in milestones {
            if let Some(ts) = ts {
                output.push_str(&format!("  {:<13}{}\n", format!("{label}:"), format_timestamp(ts)));
            }
        }

        if ticket.title.is_some() {
            output.push_str(&format!("\n{}\n{}\n", "Problema:".cyan(), ticket.problem));
        }
        if let Some(ref description) = ticket.detailed_description {
            output.push_str(&format!("\n{}\n{}\n", "Descrição:".cyan(), description));
        }
        if let Some(ref reason) = ticket.rejection_reason {
            output.push_str(&format!("\n{}\n{}\n", "Motivo da rejeição:".red(), reason));
        }

        output.push('\n');
        if actions.is_empty() {
            output.push_str(&format!("{}", "Nenhuma ação disponível.".dimmed()));
        } else {
            let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
            output.push_str(&format!("{} {}", "Ações:".green().bold(), labels.join(", ")));
        }
        output
    }

    pub fn format_solution(solution: &AiSolution) -> String {
        let mut output = format!(
            "{}\n\n{}\n",
            format!("Solução da IA - chamado #{}", solution.ticket_id).bold(),
            solution.solution_text
        );
        output.push_str(&format!(
            "\n{}",
            format!("Respondido em {}", format_timestamp(solution.responded_at)).dimmed()
        ));
        match solution.feedback {
            Some(feedback) => output.push_str(&format!(
                "\n{} {}",
                "Feedback:".cyan(),
                feedback.label()
            )),
            None => output.push_str(&format!(
                "\n{}",
                "Aguardando feedback (deu-certo | deu-errado).".yellow()
            )),
        }
        output
    }
}

pub struct UserFormatter;

impl UserFormatter {
    pub fn format_detail(user: &User) -> String {
        let mut output = format!("{} {}\n", format!("#{}", user.id).cyan(), user.name.bold());
        output.push_str(&format!("  Matrícula:     {}\n", user.matricula));
        output.push_str(&format!("  E-mail:        {}\n", user.email));
        output.push_str(&format!(
            "  Departamento:  {}\n",
            user.department.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!(
            "  Nível:         {} ({})\n",
            user.access_level,
            user.access_level.role_name()
        ));
        output.push_str(&format!("  Perfil:        {}\n", user.profile_id));
        if let Some(approver) = user.approver_id {
            output.push_str(&format!("  Aprovador:     #{approver}\n"));
        }
        output.push_str(&format!(
            "  Ativo:         {}",
            if user.active { "sim" } else { "não" }
        ));
        output
    }

    pub fn format_session(session: &Session) -> String {
        let mut output = format!("{}\n", session.display_name().bold());
        output.push_str(&format!("  E-mail: {}\n", session.email));
        output.push_str(&format!(
            "  Nível:  {} ({})",
            session.access_level,
            session.access_level.role_name()
        ));
        if let Some(id) = session.user_id {
            output.push_str(&format!("\n  Id:     #{id}"));
        }
        output
    }
}

pub struct StatsFormatter;

impl StatsFormatter {
    pub fn format(summary: &StatsSummary) -> String {
        let mut output = format!("{}\n\n", "Estatísticas".cyan().bold());
        output.push_str(&format!("  Total de chamados: {}\n", summary.total));
        output.push_str(&format!("  Em aberto:         {}\n", summary.open_count()));
        if let Some(hours) = summary.average_resolution_hours {
            output.push_str(&format!("  Tempo médio de resolução: {hours:.1} h\n"));
        }

        output.push_str(&format!("\n{}\n", "Por status:".cyan()));
        for status in ALL_STATUSES {
            let count = summary.count(*status);
            if count > 0 {
                output.push_str(&format!("  {:<20} {count}\n", status.as_str()));
            }
        }

        output.push_str(&format!("\n{}\n", "Por prioridade:".cyan()));
        for (num, count) in &summary.by_priority {
            let label = TicketPriority::try_from(*num)
                .map(|p| p.label().to_string())
                .unwrap_or_else(|_| num.to_string());
            output.push_str(&format!("  {label:<20} {count}\n"));
        }

        if !summary.by_category.is_empty() {
            output.push_str(&format!("\n{}\n", "Por categoria:".cyan()));
            for (category, count) in &summary.by_category {
                output.push_str(&format!("  {category:<20} {count}\n"));
            }
        }

        output.trim_end().to_string()
    }
}
