//! Dashboard component.
//!
//! Holds a single [`DashboardState`] and routes every change through the
//! reducer. Network work runs in async handlers that talk to the shared
//! [`ActionDispatcher`]; notifications arrive through the [`ToastQueue`].

use std::sync::Arc;
use std::time::Duration;

use iocraft::prelude::*;

use crate::api::{HelpdeskApi, HttpApi};
use crate::dispatch::{ActionDispatcher, ActionRequest, ModalControl};
use crate::notify::ToastQueue;
use crate::policy::Action;
use crate::stats::StatsSummary;
use crate::tui::components::{Footer, Modal, TOAST_TTL, render_toast};
use crate::tui::theme::theme;
use crate::types::ALL_STATUSES;

use super::model::{
    BodyViewModel, DashboardAction, DashboardState, DetailViewModel, ModalViewModel,
    TabViewModel, TicketListViewModel, compute_dashboard_view_model, key_to_action,
    pending_solution, reduce_dashboard_state, submit_request,
};

/// Shared services the dashboard runs against.
pub struct DashboardContext {
    pub dispatcher: Arc<ActionDispatcher<HttpApi>>,
    pub toasts: Arc<ToastQueue>,
}

#[derive(Default, Props)]
pub struct DashboardProps {
    pub context: Option<Arc<DashboardContext>>,
}

/// Rows taken by everything except the ticket list.
const CHROME_ROWS: u16 = 9;

fn apply(state: &mut State<DashboardState>, action: DashboardAction, list_height: usize) {
    let current = state.read().clone();
    state.set(reduce_dashboard_state(current, action, list_height));
}

/// Drives the dashboard's modal from inside the dispatcher.
struct DashboardModal {
    state: State<DashboardState>,
    list_height: usize,
}

impl ModalControl for DashboardModal {
    fn set_processing(&mut self, processing: bool) {
        apply(
            &mut self.state,
            DashboardAction::SetProcessing(processing),
            self.list_height,
        );
    }

    fn close(&mut self) {
        apply(&mut self.state, DashboardAction::CloseModal, self.list_height);
    }
}

/// Copy every cached view into the state, then load statistics if allowed.
async fn sync_from_repository(
    ctx: &DashboardContext,
    state: &mut State<DashboardState>,
    list_height: usize,
) {
    let repository = ctx.dispatcher.repository();
    for view in repository.permitted_views() {
        if let Some(tickets) = repository.cached(view) {
            apply(state, DashboardAction::TicketsLoaded(view, tickets), list_height);
        }
    }
    if repository.require(Action::ViewStatistics).is_ok() {
        match repository.statistics().await {
            Ok(stats) => apply(state, DashboardAction::StatsLoaded(stats), list_height),
            Err(e) => {
                tracing::warn!("failed to load statistics: {e}");
                apply(state, DashboardAction::LoadFailed(e.user_message()), list_height);
            }
        }
    }
}

#[component]
pub fn Dashboard<'a>(props: &DashboardProps, mut hooks: Hooks) -> impl Into<AnyElement<'a>> {
    let Some(ctx) = props.context.clone() else {
        return element! {
            View { Text(content: "Dashboard sem contexto.", color: Color::Red) }
        };
    };

    let (width, height) = hooks.use_terminal_size();
    let mut system = hooks.use_context_mut::<SystemContext>();
    let theme = theme();

    let list_height = height.saturating_sub(CHROME_ROWS).max(1) as usize;
    let session = ctx.dispatcher.repository().session().clone();
    let mut state = hooks.use_state(move || DashboardState::new(session));

    let load_handler: Handler<()> = hooks.use_async_handler({
        let ctx = ctx.clone();
        move |()| {
            let ctx = ctx.clone();
            let mut state = state;
            async move {
                if let Err(e) = ctx.dispatcher.repository().refresh().await {
                    apply(&mut state, DashboardAction::LoadFailed(e.user_message()), list_height);
                }
                sync_from_repository(&ctx, &mut state, list_height).await;
            }
        }
    });

    let submit_handler: Handler<ActionRequest> = hooks.use_async_handler({
        let ctx = ctx.clone();
        move |request: ActionRequest| {
            let ctx = ctx.clone();
            let mut state = state;
            async move {
                let mut modal = DashboardModal { state, list_height };
                // Failures are reported through the toast queue.
                let succeeded = ctx.dispatcher.dispatch(request, &mut modal).await.is_ok();
                if succeeded {
                    sync_from_repository(&ctx, &mut state, list_height).await;
                }
            }
        }
    });

    let solution_handler: Handler<u64> = hooks.use_async_handler({
        let ctx = ctx.clone();
        move |ticket_id: u64| {
            let ctx = ctx.clone();
            let mut state = state;
            async move {
                match ctx.dispatcher.repository().api().ai_solution(ticket_id).await {
                    Ok(solution) => {
                        apply(&mut state, DashboardAction::SolutionLoaded(solution), list_height)
                    }
                    Err(e) => {
                        apply(&mut state, DashboardAction::CloseModal, list_height);
                        apply(&mut state, DashboardAction::LoadFailed(e.user_message()), list_height);
                    }
                }
            }
        }
    });

    // Initial load
    let mut started = hooks.use_state(|| false);
    if !started.get() {
        started.set(true);
        load_handler.clone()(());
    }

    // Move queued notifications onto the screen and expire old toasts.
    hooks.use_future({
        let toasts = ctx.toasts.clone();
        let mut state = state;
        async move {
            loop {
                tokio::time::sleep(Duration::from_millis(100)).await;
                if let Some(notification) = toasts.pop() {
                    apply(&mut state, DashboardAction::Notify(notification), list_height);
                    continue;
                }
                let expired = state
                    .read()
                    .toast
                    .as_ref()
                    .is_some_and(|t| t.is_expired(TOAST_TTL));
                if expired {
                    apply(&mut state, DashboardAction::DismissToast, list_height);
                }
            }
        }
    });

    hooks.use_terminal_events({
        let load_handler = load_handler.clone();
        let submit_handler = submit_handler.clone();
        let solution_handler = solution_handler.clone();
        move |event| match event {
            TerminalEvent::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) if kind != KeyEventKind::Release => {
                let current = state.read().clone();
                let Some(action) = key_to_action(code, modifiers, &current) else {
                    return;
                };
                match action {
                    DashboardAction::SubmitModal => {
                        if let Some(request) = submit_request(&current) {
                            submit_handler(request);
                        }
                    }
                    DashboardAction::Refresh => {
                        state.set(reduce_dashboard_state(current, action, list_height));
                        load_handler(());
                    }
                    action @ DashboardAction::OpenAction(_) => {
                        let next = reduce_dashboard_state(current, action, list_height);
                        let pending = pending_solution(&next);
                        state.set(next);
                        if let Some(ticket_id) = pending {
                            solution_handler(ticket_id);
                        }
                    }
                    other => state.set(reduce_dashboard_state(current, other, list_height)),
                }
            }
            _ => {}
        }
    });

    let current = state.read().clone();
    if current.should_exit {
        system.exit();
    }

    let vm = compute_dashboard_view_model(&current, list_height);

    element! {
        View(
            width,
            height,
            flex_direction: FlexDirection::Column,
            background_color: theme.background,
            position: Position::Relative,
        ) {
            View(width: 100pct, height: 1, padding_left: 1, padding_right: 1, flex_direction: FlexDirection::Row) {
                Text(content: "Helpdesk", color: theme.highlight, weight: Weight::Bold)
                View(flex_grow: 1.0)
                Text(
                    content: format!("{} - {}{}", vm.header.user, vm.header.role,
                        if vm.header.loading { " (carregando...)" } else { "" }),
                    color: theme.text_dimmed,
                )
            }
            #(render_tabs(&vm.tabs))
            View(flex_grow: 1.0, width: 100pct, flex_direction: FlexDirection::Row) {
                View(
                    flex_grow: 1.0,
                    border_style: BorderStyle::Round,
                    border_color: theme.border_focused,
                    flex_direction: FlexDirection::Column,
                ) {
                    #(render_body(&vm.body))
                }
                #(vm.detail.as_ref().map(render_detail))
            }
            Footer(shortcuts: vm.shortcuts.clone())
            #(render_toast(&vm.toast))
            #(vm.modal.as_ref().map(render_modal))
        }
    }
}

fn render_tabs(tabs: &[TabViewModel]) -> AnyElement<'static> {
    let theme = theme();
    element! {
        View(width: 100pct, height: 1, padding_left: 1, column_gap: 2, flex_direction: FlexDirection::Row) {
            #(tabs.iter().enumerate().map(|(i, tab)| {
                let color = if tab.active {
                    theme.highlight
                } else if tab.allowed {
                    theme.text
                } else {
                    theme.text_dimmed
                };
                element! {
                    Text(
                        content: format!("{} {}", i + 1, tab.title),
                        color: color,
                        weight: if tab.active { Weight::Bold } else { Weight::Normal },
                    )
                }
            }))
        }
    }
    .into_any()
}

fn render_body(body: &BodyViewModel) -> AnyElement<'static> {
    let theme = theme();
    match body {
        BodyViewModel::AccessDenied { message } => element! {
            View(padding: 1) { Text(content: message.clone(), color: theme.denied) }
        }
        .into_any(),
        BodyViewModel::Loading => element! {
            View(padding: 1) { Text(content: "Carregando...", color: theme.text_dimmed) }
        }
        .into_any(),
        BodyViewModel::Error { message } => element! {
            View(padding: 1) { Text(content: message.clone(), color: Color::Red) }
        }
        .into_any(),
        BodyViewModel::Tickets(list) => render_ticket_list(list),
        BodyViewModel::Stats(stats) => render_stats(stats),
    }
}

fn render_ticket_list(list: &TicketListViewModel) -> AnyElement<'static> {
    let theme = theme();
    if list.rows.is_empty() {
        return element! {
            View(padding: 1) { Text(content: list.empty_message, color: theme.text_dimmed) }
        }
        .into_any();
    }
    element! {
        View(flex_direction: FlexDirection::Column, padding_left: 1, padding_right: 1) {
            #(list.rows.iter().map(|row| {
                element! {
                    View(
                        flex_direction: FlexDirection::Row,
                        column_gap: 1,
                        background_color: if row.selected { Some(theme.highlight) } else { None },
                    ) {
                        Text(content: format!("#{:<5}", row.id), color: theme.id_color)
                        Text(
                            content: format!("{:<20}", row.status.as_str()),
                            color: theme.status_color(row.status),
                        )
                        Text(
                            content: format!("{:<8}", row.priority.label()),
                            color: theme.priority_color(row.priority),
                        )
                        Text(content: row.title.clone(), color: theme.text)
                    }
                }
            }))
            Text(content: format!("{} chamado(s)", list.total), color: theme.text_dimmed)
        }
    }
    .into_any()
}

fn render_stats(stats: &StatsSummary) -> AnyElement<'static> {
    let theme = theme();
    let mut lines = vec![
        format!("Total de chamados: {}", stats.total),
        format!("Em andamento: {}", stats.open_count()),
    ];
    if let Some(hours) = stats.average_resolution_hours {
        lines.push(format!("Tempo médio de resolução: {hours:.1} h"));
    }
    lines.push(String::new());
    for status in ALL_STATUSES {
        let n = stats.count(*status);
        if n > 0 {
            lines.push(format!("{:<20} {n}", status.as_str()));
        }
    }
    element! {
        View(flex_direction: FlexDirection::Column, padding: 1) {
            #(lines.into_iter().map(|line| element! { Text(content: line, color: theme.text) }))
        }
    }
    .into_any()
}

fn render_detail(detail: &DetailViewModel) -> AnyElement<'static> {
    let theme = theme();
    let ticket = &detail.ticket;
    let mut lines = vec![
        (format!("Chamado #{}", ticket.id), theme.id_color),
        (ticket.display_title().to_string(), theme.text),
        (format!("Status: {}", ticket.status), theme.status_color(ticket.status)),
        (format!("Prioridade: {}", ticket.priority), theme.priority_color(ticket.priority)),
        (format!("Categoria: {}", ticket.category), theme.text),
        (
            format!("Aberto por: {} <{}>", ticket.opened_by_user.name, ticket.opened_by_user.email),
            theme.text_dimmed,
        ),
        (format!("Aberto em: {}", ticket.opened_at), theme.text_dimmed),
    ];
    if let Some(reason) = &ticket.rejection_reason {
        lines.push((format!("Motivo da rejeição: {reason}"), Color::Red));
    }
    if let Some(description) = &ticket.detailed_description {
        lines.push((String::new(), theme.text));
        lines.push((description.clone(), theme.text));
    }
    let actions: Vec<&str> = detail.actions.iter().map(Action::label).collect();
    lines.push((String::new(), theme.text));
    lines.push((
        if actions.is_empty() {
            "Nenhuma ação disponível.".to_string()
        } else {
            format!("Ações: {}", actions.join(", "))
        },
        theme.highlight,
    ));

    element! {
        View(
            width: 45pct,
            border_style: BorderStyle::Round,
            border_color: theme.border,
            flex_direction: FlexDirection::Column,
            padding_left: 1,
            padding_right: 1,
        ) {
            #(lines.into_iter().map(|(line, color)| element! { Text(content: line, color: color) }))
        }
    }
    .into_any()
}

fn render_modal(modal: &ModalViewModel) -> AnyElement<'static> {
    let theme = theme();
    let submit_hint = if modal.processing {
        "Processando...".to_string()
    } else if modal.submit_enabled {
        format!("[Enter] {}  [Esc] cancelar", modal.submit_label)
    } else {
        format!("({} desabilitado)  [Esc] cancelar", modal.submit_label)
    };

    let mut lines: Vec<(String, Color)> = vec![(modal.prompt.clone(), theme.text)];
    if modal.show_reason {
        lines.push((format!("> {}_", modal.reason), theme.text));
        let color = if modal.reason_chars >= modal.min_reason_chars {
            Color::Green
        } else {
            theme.text_dimmed
        };
        lines.push((
            format!(
                "{}/{} caracteres mínimos",
                modal.reason_chars, modal.min_reason_chars
            ),
            color,
        ));
    }
    if modal.show_solution {
        match &modal.solution_text {
            None => lines.push(("Carregando solução...".to_string(), theme.text_dimmed)),
            Some(text) => {
                lines.insert(0, (text.clone(), theme.text));
                lines.insert(1, (String::new(), theme.text));
                match modal.recorded_feedback {
                    Some(recorded) => lines.push((
                        format!("Feedback já registrado: {}", recorded.label()),
                        theme.text_dimmed,
                    )),
                    None => lines.push((
                        format!("Resposta: < {} >", modal.feedback.label()),
                        theme.highlight,
                    )),
                }
            }
        }
    }

    element! {
        Modal(title: modal.title.clone(), tone: modal.tone, footer_text: Some(submit_hint)) {
            #(lines.into_iter().map(|(line, color)| element! { Text(content: line, color: color) }))
        }
    }
    .into_any()
}
