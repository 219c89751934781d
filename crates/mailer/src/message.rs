use engine::{ExpenseNotice, Money, Notification, WeeklySummary};
use serde::Serialize;

pub const EXPENSE_SUBJECT: &str = "Notification: New Expense Created on Splitwise";
pub const WEEKLY_SUBJECT: &str = "Your Weekly Splitwise Summary";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Turns a notification into the email sent for it.
pub fn render(notification: &Notification, from: &str, currency_symbol: &str) -> EmailMessage {
    match notification {
        Notification::ExpenseNotice(notice) => expense_notice(notice, from),
        Notification::WeeklySummary(summary) => weekly_summary(summary, from, currency_symbol),
    }
}

fn expense_notice(notice: &ExpenseNotice, from: &str) -> EmailMessage {
    let body = format!(
        "Dear {debtor},\n\n\
         You've been included in a new expense by {payer}.\n\n\
         Expense Details:\n\
         Amount: {amount}\n\n\
         Please take a moment to review the details and address any necessary actions.\n\
         Thank you",
        debtor = notice.debtor_name,
        payer = notice.payer_name,
        amount = notice.amount,
    );
    EmailMessage {
        from: from.to_string(),
        to: vec![notice.debtor_email.clone()],
        subject: EXPENSE_SUBJECT.to_string(),
        body,
    }
}

fn weekly_summary(summary: &WeeklySummary, from: &str, symbol: &str) -> EmailMessage {
    let mut breakdown: Vec<String> = summary
        .lines
        .iter()
        .map(|line| format!("{}: {}", line.creditor_name, with_symbol(symbol, line.amount)))
        .collect();
    breakdown.push(String::new());
    breakdown.push(format!(
        "Total Owed Amount: {}",
        with_symbol(symbol, summary.total)
    ));

    let body = format!(
        "Dear {name},\n\n\
         We hope this message finds you well. As part of our weekly Splitwise summary, \
         here's a breakdown of the amounts you owe to other users:\n\n\
         {breakdown}\n\n\
         Please take a moment to review the details and address any necessary actions.\n\n\
         Thank you",
        name = summary.user_name,
        breakdown = breakdown.join("\n"),
    );
    EmailMessage {
        from: from.to_string(),
        to: vec![summary.user_email.clone()],
        subject: WEEKLY_SUBJECT.to_string(),
        body,
    }
}

fn with_symbol(symbol: &str, amount: Money) -> String {
    format!("{symbol}{amount}")
}
