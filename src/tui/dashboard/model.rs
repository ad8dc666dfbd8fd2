//! Dashboard state, reducer and view model.
//!
//! Everything here is pure so it can be tested without iocraft. The view
//! feeds key events through [`key_to_action`], applies the result with
//! [`reduce_dashboard_state`] and renders [`compute_dashboard_view_model`].
//! Actions marked external ([`DashboardAction::SubmitModal`],
//! [`DashboardAction::Refresh`]) are no-ops here; the view runs them
//! asynchronously and reports back with load/notify actions.

use std::collections::HashMap;

use iocraft::prelude::{KeyCode, KeyModifiers};

use crate::ai::{AiFeedback, AiSolution};
use crate::api::TicketView;
use crate::dispatch::ActionRequest;
use crate::notify::Notification;
use crate::policy::{Action, Denial, can_perform, legal_actions, reason_is_valid};
use crate::session::Session;
use crate::stats::StatsSummary;
use crate::ticket::Ticket;
use crate::tui::components::{ModalTone, Shortcut};
use crate::types::{MIN_REASON_CHARS, TicketPriority, TicketStatus};

// ============================================================================
// State Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Tab {
    #[default]
    Mine,
    Pending,
    Escalated,
    Stats,
}

pub const ALL_TABS: &[Tab] = &[Tab::Mine, Tab::Pending, Tab::Escalated, Tab::Stats];

impl Tab {
    pub fn view(&self) -> Option<TicketView> {
        match self {
            Tab::Mine => Some(TicketView::Own),
            Tab::Pending => Some(TicketView::PendingApproval),
            Tab::Escalated => Some(TicketView::Escalated),
            Tab::Stats => None,
        }
    }

    pub fn required_action(&self) -> Action {
        match self.view() {
            Some(view) => view.required_action(),
            None => Action::ViewStatistics,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.view() {
            Some(view) => view.title(),
            None => "Estatísticas",
        }
    }

    fn index(&self) -> usize {
        ALL_TABS.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        ALL_TABS[(self.index() + 1) % ALL_TABS.len()]
    }

    pub fn prev(&self) -> Tab {
        ALL_TABS[(self.index() + ALL_TABS.len() - 1) % ALL_TABS.len()]
    }
}

/// The modal hosting a ticket action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionModal {
    /// Approve, Reject, Resolve, Escalate, ResolveEscalated or ViewAiSolution
    pub action: Action,
    pub ticket: Ticket,
    pub reason: String,
    /// Loaded asynchronously for ViewAiSolution
    pub solution: Option<AiSolution>,
    pub feedback: AiFeedback,
    /// Request in flight; submit and cancel are disabled
    pub processing: bool,
}

impl ActionModal {
    pub fn new(action: Action, ticket: Ticket) -> Self {
        Self {
            action,
            ticket,
            reason: String::new(),
            solution: None,
            feedback: AiFeedback::DeuCerto,
            processing: false,
        }
    }

    /// The permission submitting this modal exercises.
    pub fn submit_action(&self) -> Action {
        match self.action {
            Action::ViewAiSolution => Action::GiveFeedback,
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub session: Session,
    pub tab: Tab,
    pub tickets: HashMap<TicketView, Vec<Ticket>>,
    pub stats: Option<StatsSummary>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub show_detail: bool,
    pub loading: bool,
    pub load_error: Option<String>,
    pub modal: Option<ActionModal>,
    pub toast: Option<Notification>,
    pub should_exit: bool,
}

impl DashboardState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            tab: Tab::default(),
            tickets: HashMap::new(),
            stats: None,
            selected_index: 0,
            scroll_offset: 0,
            show_detail: true,
            loading: true,
            load_error: None,
            modal: None,
            toast: None,
            should_exit: false,
        }
    }

    pub fn tab_access(&self, tab: Tab) -> Result<(), Denial> {
        can_perform(tab.required_action(), &self.session, None)
    }

    /// Tickets of the active tab; empty for the statistics tab or a tab the
    /// session may not see.
    pub fn current_tickets(&self) -> &[Ticket] {
        self.tab
            .view()
            .filter(|_| self.tab_access(self.tab).is_ok())
            .and_then(|view| self.tickets.get(&view))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn selected_ticket(&self) -> Option<&Ticket> {
        self.current_tickets().get(self.selected_index)
    }
}

// ============================================================================
// Action Types
// ============================================================================

#[derive(Debug, Clone)]
pub enum DashboardAction {
    // Navigation
    MoveUp,
    MoveDown,
    GoToTop,
    GoToBottom,
    NextTab,
    PrevTab,
    SelectTab(Tab),
    ToggleDetail,

    // Modal
    /// Open the modal for a ticket action on the selected ticket
    OpenAction(Action),
    ReasonInput(char),
    ReasonBackspace,
    ToggleFeedback,
    CancelModal,
    SetProcessing(bool),
    CloseModal,

    // Operations (async - handled externally)
    SubmitModal,
    Refresh,

    // Results
    TicketsLoaded(TicketView, Vec<Ticket>),
    StatsLoaded(StatsSummary),
    SolutionLoaded(AiSolution),
    LoadFailed(String),
    Notify(Notification),
    DismissToast,

    Quit,
}

// ============================================================================
// View Model Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct DashboardViewModel {
    pub header: HeaderViewModel,
    pub tabs: Vec<TabViewModel>,
    pub body: BodyViewModel,
    pub detail: Option<DetailViewModel>,
    pub modal: Option<ModalViewModel>,
    pub toast: Option<Notification>,
    pub shortcuts: Vec<Shortcut>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderViewModel {
    pub user: String,
    pub role: String,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabViewModel {
    pub tab: Tab,
    pub title: &'static str,
    pub active: bool,
    pub allowed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyViewModel {
    /// The session may not open this tab
    AccessDenied { message: String },
    Loading,
    Error { message: String },
    Tickets(TicketListViewModel),
    Stats(StatsSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketListViewModel {
    pub rows: Vec<TicketRow>,
    pub total: usize,
    pub empty_message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRow {
    pub id: u64,
    pub title: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub opened_by: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailViewModel {
    pub ticket: Ticket,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalViewModel {
    pub title: String,
    pub prompt: String,
    pub tone: ModalTone,
    pub show_reason: bool,
    pub reason: String,
    pub reason_chars: usize,
    pub min_reason_chars: usize,
    pub show_solution: bool,
    /// None while the solution is loading
    pub solution_text: Option<String>,
    /// Feedback already recorded for this solution
    pub recorded_feedback: Option<AiFeedback>,
    pub feedback: AiFeedback,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub processing: bool,
}

// ============================================================================
// Pure Functions
// ============================================================================

/// Whether the modal's submit button is enabled.
pub fn submit_enabled(modal: &ActionModal, session: &Session) -> bool {
    if modal.processing {
        return false;
    }
    if can_perform(modal.submit_action(), session, Some(&modal.ticket)).is_err() {
        return false;
    }
    match modal.action {
        Action::Reject | Action::Escalate => reason_is_valid(&modal.reason),
        Action::ViewAiSolution => modal
            .solution
            .as_ref()
            .is_some_and(|s| s.accepts_feedback()),
        _ => true,
    }
}

/// The request the open modal would submit, if submission is enabled.
pub fn submit_request(state: &DashboardState) -> Option<ActionRequest> {
    let modal = state.modal.as_ref()?;
    if !submit_enabled(modal, &state.session) {
        return None;
    }
    let ticket = modal.ticket.clone();
    match modal.action {
        Action::Approve => Some(ActionRequest::Approve(ticket)),
        Action::Reject => Some(ActionRequest::Reject {
            ticket,
            motivo: modal.reason.clone(),
        }),
        Action::Resolve => Some(ActionRequest::Resolve(ticket)),
        Action::Escalate => Some(ActionRequest::Escalate {
            ticket,
            motivo: modal.reason.clone(),
        }),
        Action::ResolveEscalated => Some(ActionRequest::ResolveEscalated(ticket)),
        Action::ViewAiSolution => Some(ActionRequest::SubmitFeedback {
            ticket,
            solution: modal.solution.clone()?,
            feedback: modal.feedback,
        }),
        _ => None,
    }
}

/// Ticket id whose AI solution the open modal is waiting for.
pub fn pending_solution(state: &DashboardState) -> Option<u64> {
    state
        .modal
        .as_ref()
        .filter(|m| m.action == Action::ViewAiSolution && m.solution.is_none())
        .map(|m| m.ticket.id)
}

fn modal_view_model(modal: &ActionModal, session: &Session) -> ModalViewModel {
    let id = modal.ticket.id;
    let (title, prompt, tone, submit_label) = match modal.action {
        Action::Approve => (
            format!("Aprovar chamado #{id}"),
            "Confirma a aprovação deste chamado?".to_string(),
            ModalTone::Normal,
            "Aprovar",
        ),
        Action::Reject => (
            format!("Rejeitar chamado #{id}"),
            "Informe o motivo da rejeição:".to_string(),
            ModalTone::Danger,
            "Rejeitar",
        ),
        Action::Resolve => (
            format!("Resolver chamado #{id}"),
            "Marcar este chamado como resolvido?".to_string(),
            ModalTone::Normal,
            "Resolver",
        ),
        Action::Escalate => (
            format!("Escalar chamado #{id}"),
            "Informe o motivo do escalonamento:".to_string(),
            ModalTone::Warning,
            "Escalar",
        ),
        Action::ResolveEscalated => (
            format!("Resolver chamado escalado #{id}"),
            "Marcar este chamado escalado como resolvido?".to_string(),
            ModalTone::Normal,
            "Resolver",
        ),
        _ => (
            format!("Solução da IA - chamado #{id}"),
            "A solução resolveu o seu problema?".to_string(),
            ModalTone::Normal,
            "Enviar feedback",
        ),
    };

    ModalViewModel {
        title,
        prompt,
        tone,
        show_reason: modal.action.requires_reason(),
        reason: modal.reason.clone(),
        reason_chars: modal.reason.trim().chars().count(),
        min_reason_chars: MIN_REASON_CHARS,
        show_solution: modal.action == Action::ViewAiSolution,
        solution_text: modal.solution.as_ref().map(|s| s.solution_text.clone()),
        recorded_feedback: modal.solution.as_ref().and_then(|s| s.feedback),
        feedback: modal.feedback,
        submit_label,
        submit_enabled: submit_enabled(modal, session),
        processing: modal.processing,
    }
}

fn access_denied_message(tab: Tab, denial: &Denial) -> String {
    match denial {
        Denial::InsufficientLevel { required, .. } => format!(
            "Acesso negado: \"{}\" requer nível de acesso {} ({}).",
            tab.title(),
            required,
            required.role_name()
        ),
        other => format!("Acesso negado: {other}"),
    }
}

fn compute_shortcuts(state: &DashboardState) -> Vec<Shortcut> {
    if let Some(modal) = &state.modal {
        let mut shortcuts = vec![Shortcut::new("Enter", "confirmar"), Shortcut::new("Esc", "cancelar")];
        if modal.action == Action::ViewAiSolution {
            shortcuts.push(Shortcut::new("Tab", "alternar resposta"));
        }
        return shortcuts;
    }

    let mut shortcuts = vec![
        Shortcut::new("q", "sair"),
        Shortcut::new("Tab", "aba"),
        Shortcut::new("j/k", "navegar"),
        Shortcut::new("r", "atualizar"),
        Shortcut::new("Enter", "detalhes"),
    ];
    if let Some(ticket) = state.selected_ticket() {
        for action in legal_actions(&state.session, ticket) {
            let key = match action {
                Action::Approve => "a",
                Action::Reject => "x",
                Action::Resolve | Action::ResolveEscalated => "s",
                Action::Escalate => "e",
                Action::ViewAiSolution => "i",
                _ => continue,
            };
            shortcuts.push(Shortcut::new(key, action.label().to_lowercase()));
        }
    }
    shortcuts
}

/// Compute the view model rendered by the dashboard.
pub fn compute_dashboard_view_model(state: &DashboardState, list_height: usize) -> DashboardViewModel {
    let tabs = ALL_TABS
        .iter()
        .map(|tab| TabViewModel {
            tab: *tab,
            title: tab.title(),
            active: *tab == state.tab,
            allowed: state.tab_access(*tab).is_ok(),
        })
        .collect();

    let body = match state.tab_access(state.tab) {
        Err(denial) => BodyViewModel::AccessDenied {
            message: access_denied_message(state.tab, &denial),
        },
        Ok(()) => match state.tab.view() {
            None => match &state.stats {
                Some(stats) => BodyViewModel::Stats(stats.clone()),
                None if state.load_error.is_some() => BodyViewModel::Error {
                    message: state.load_error.clone().unwrap_or_default(),
                },
                None => BodyViewModel::Loading,
            },
            Some(view) => match state.tickets.get(&view) {
                None if state.loading => BodyViewModel::Loading,
                None if state.load_error.is_some() => BodyViewModel::Error {
                    message: state.load_error.clone().unwrap_or_default(),
                },
                tickets => {
                    let tickets = tickets.map(Vec::as_slice).unwrap_or(&[]);
                    let end = (state.scroll_offset + list_height).min(tickets.len());
                    let start = state.scroll_offset.min(end);
                    BodyViewModel::Tickets(TicketListViewModel {
                        rows: tickets[start..end]
                            .iter()
                            .enumerate()
                            .map(|(i, t)| TicketRow {
                                id: t.id,
                                title: t.display_title().to_string(),
                                status: t.status,
                                priority: t.priority,
                                opened_by: t.opened_by_user.name.clone(),
                                selected: start + i == state.selected_index,
                            })
                            .collect(),
                        total: tickets.len(),
                        empty_message: match view {
                            TicketView::Own => "Você ainda não abriu nenhum chamado.",
                            TicketView::PendingApproval => "Nenhum chamado aguardando aprovação.",
                            TicketView::Escalated => "Nenhum chamado escalado.",
                        },
                    })
                }
            },
        },
    };

    let detail = state
        .selected_ticket()
        .filter(|_| state.show_detail)
        .map(|ticket| DetailViewModel {
            ticket: ticket.clone(),
            actions: legal_actions(&state.session, ticket),
        });

    DashboardViewModel {
        header: HeaderViewModel {
            user: state.session.display_name().to_string(),
            role: state.session.access_level.role_name().to_string(),
            loading: state.loading,
        },
        tabs,
        body,
        detail,
        modal: state
            .modal
            .as_ref()
            .map(|m| modal_view_model(m, &state.session)),
        toast: state.toast.clone(),
        shortcuts: compute_shortcuts(state),
    }
}

fn select_tab(mut state: DashboardState, tab: Tab) -> DashboardState {
    if state.tab != tab {
        state.tab = tab;
        state.selected_index = 0;
        state.scroll_offset = 0;
    }
    state
}

/// Pure function: apply an action to the state.
pub fn reduce_dashboard_state(
    mut state: DashboardState,
    action: DashboardAction,
    list_height: usize,
) -> DashboardState {
    let count = state.current_tickets().len();

    match action {
        DashboardAction::MoveUp => {
            state.selected_index = state.selected_index.saturating_sub(1);
            state.scroll_offset =
                adjust_scroll(state.scroll_offset, state.selected_index, list_height);
        }
        DashboardAction::MoveDown => {
            if count > 0 {
                state.selected_index = (state.selected_index + 1).min(count - 1);
                state.scroll_offset =
                    adjust_scroll(state.scroll_offset, state.selected_index, list_height);
            }
        }
        DashboardAction::GoToTop => {
            state.selected_index = 0;
            state.scroll_offset = 0;
        }
        DashboardAction::GoToBottom => {
            if count > 0 {
                state.selected_index = count - 1;
                state.scroll_offset =
                    adjust_scroll(state.scroll_offset, state.selected_index, list_height);
            }
        }
        DashboardAction::NextTab => {
            let next = state.tab.next();
            state = select_tab(state, next);
        }
        DashboardAction::PrevTab => {
            let prev = state.tab.prev();
            state = select_tab(state, prev);
        }
        DashboardAction::SelectTab(tab) => state = select_tab(state, tab),
        DashboardAction::ToggleDetail => state.show_detail = !state.show_detail,

        DashboardAction::OpenAction(action) => {
            if state.modal.is_some() {
                return state;
            }
            if let Some(ticket) = state.selected_ticket().cloned() {
                match can_perform(action, &state.session, Some(&ticket)) {
                    Ok(()) => state.modal = Some(ActionModal::new(action, ticket)),
                    Err(denial) => {
                        state.toast =
                            Some(Notification::warning(denial.into_error(action).user_message()));
                    }
                }
            }
        }
        DashboardAction::ReasonInput(c) => {
            if let Some(modal) = state.modal.as_mut()
                && modal.action.requires_reason()
                && !modal.processing
            {
                modal.reason.push(c);
            }
        }
        DashboardAction::ReasonBackspace => {
            if let Some(modal) = state.modal.as_mut()
                && !modal.processing
            {
                modal.reason.pop();
            }
        }
        DashboardAction::ToggleFeedback => {
            if let Some(modal) = state.modal.as_mut()
                && modal.action == Action::ViewAiSolution
                && !modal.processing
            {
                modal.feedback = modal.feedback.toggle();
            }
        }
        DashboardAction::CancelModal => {
            if state.modal.as_ref().is_some_and(|m| !m.processing) {
                state.modal = None;
            }
        }
        DashboardAction::SetProcessing(processing) => {
            if let Some(modal) = state.modal.as_mut() {
                modal.processing = processing;
            }
        }
        DashboardAction::CloseModal => state.modal = None,

        DashboardAction::SubmitModal => {}
        DashboardAction::Refresh => state.loading = true,

        DashboardAction::TicketsLoaded(view, tickets) => {
            state.tickets.insert(view, tickets);
            state.loading = false;
            state.load_error = None;
            let count = state.current_tickets().len();
            state.selected_index = state.selected_index.min(count.saturating_sub(1));
            state.scroll_offset =
                adjust_scroll(state.scroll_offset, state.selected_index, list_height);
        }
        DashboardAction::StatsLoaded(stats) => {
            state.stats = Some(stats);
            state.loading = false;
        }
        DashboardAction::SolutionLoaded(solution) => {
            if let Some(modal) = state.modal.as_mut()
                && modal.action == Action::ViewAiSolution
                && modal.ticket.id == solution.ticket_id
            {
                modal.solution = Some(solution);
            }
        }
        DashboardAction::LoadFailed(message) => {
            state.loading = false;
            state.toast = Some(Notification::error(message.clone()));
            state.load_error = Some(message);
        }
        DashboardAction::Notify(notification) => state.toast = Some(notification),
        DashboardAction::DismissToast => state.toast = None,

        DashboardAction::Quit => state.should_exit = true,
    }

    state
}

/// Keep the selected row inside the visible window.
pub fn adjust_scroll(scroll_offset: usize, selected_index: usize, list_height: usize) -> usize {
    if list_height == 0 {
        return 0;
    }
    if selected_index < scroll_offset {
        return selected_index;
    }
    if selected_index >= scroll_offset + list_height {
        return selected_index.saturating_sub(list_height - 1);
    }
    scroll_offset
}

/// Map a key event to an action, given the current state.
pub fn key_to_action(
    code: KeyCode,
    modifiers: KeyModifiers,
    state: &DashboardState,
) -> Option<DashboardAction> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Some(DashboardAction::Quit);
    }

    if let Some(modal) = &state.modal {
        return modal_key_to_action(code, modifiers, modal, state);
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(DashboardAction::Quit),
        KeyCode::Tab => Some(DashboardAction::NextTab),
        KeyCode::BackTab => Some(DashboardAction::PrevTab),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            ALL_TABS.get(index).map(|tab| DashboardAction::SelectTab(*tab))
        }
        KeyCode::Char('j') | KeyCode::Down => Some(DashboardAction::MoveDown),
        KeyCode::Char('k') | KeyCode::Up => Some(DashboardAction::MoveUp),
        KeyCode::Char('g') | KeyCode::Home => Some(DashboardAction::GoToTop),
        KeyCode::Char('G') | KeyCode::End => Some(DashboardAction::GoToBottom),
        KeyCode::Enter => Some(DashboardAction::ToggleDetail),
        KeyCode::Char('r') => Some(DashboardAction::Refresh),
        KeyCode::Char('a') => Some(DashboardAction::OpenAction(Action::Approve)),
        KeyCode::Char('x') => Some(DashboardAction::OpenAction(Action::Reject)),
        KeyCode::Char('e') => Some(DashboardAction::OpenAction(Action::Escalate)),
        KeyCode::Char('i') => Some(DashboardAction::OpenAction(Action::ViewAiSolution)),
        KeyCode::Char('s') => {
            let escalated = state
                .selected_ticket()
                .is_some_and(|t| t.status == TicketStatus::Escalado);
            Some(DashboardAction::OpenAction(if escalated {
                Action::ResolveEscalated
            } else {
                Action::Resolve
            }))
        }
        _ => None,
    }
}

fn modal_key_to_action(
    code: KeyCode,
    modifiers: KeyModifiers,
    modal: &ActionModal,
    state: &DashboardState,
) -> Option<DashboardAction> {
    match code {
        KeyCode::Esc => Some(DashboardAction::CancelModal),
        KeyCode::Enter => {
            submit_enabled(modal, &state.session).then_some(DashboardAction::SubmitModal)
        }
        KeyCode::Backspace if modal.action.requires_reason() => {
            Some(DashboardAction::ReasonBackspace)
        }
        KeyCode::Char(c)
            if modal.action.requires_reason() && !modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(DashboardAction::ReasonInput(c))
        }
        KeyCode::Tab | KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
            if modal.action == Action::ViewAiSolution =>
        {
            Some(DashboardAction::ToggleFeedback)
        }
        _ => None,
    }
}
