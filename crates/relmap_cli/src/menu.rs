//! Numbered menus and input parsing.
//!
//! # Invariants
//! - Unparseable input maps to `MenuChoice::Invalid`; parsing never fails.
//! - Option numbers are 1-based and follow `entries` order.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Selected(u32),
    Invalid,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        input
            .trim()
            .parse::<u32>()
            .map_or(Self::Invalid, Self::Selected)
    }
}

pub struct Menu<A: 'static> {
    pub title: &'static str,
    pub entries: &'static [(A, &'static str)],
}

impl<A: Copy> Menu<A> {
    pub fn render(&self) -> String {
        let mut out = format!("\n===== {} =====\n", self.title);
        for (index, (_, label)) in self.entries.iter().enumerate() {
            let _ = writeln!(out, "{}. {label}", index + 1);
        }
        out.push_str("Select an option: ");
        out
    }

    /// Action for `choice`, or `None` when it is invalid or out of range.
    pub fn select(&self, choice: MenuChoice) -> Option<A> {
        let MenuChoice::Selected(number) = choice else {
            return None;
        };
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.entries.get(index).map(|(action, _)| *action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainAction {
    Bookstore,
    Company,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookstoreAction {
    CreateData,
    BooksWithPublisherAndAuthor,
    AuthorsWithBooks,
    BookstoresWithBooks,
    BooksWithBookstores,
    DeleteData,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyAction {
    CreateData,
    OneToOne,
    OneToMany,
    ManyToMany,
    DeleteData,
    Back,
}

pub const MAIN_MENU: Menu<MainAction> = Menu {
    title: "RELMAP",
    entries: &[
        (MainAction::Bookstore, "Bookstore management"),
        (MainAction::Company, "Company management"),
        (MainAction::Exit, "Exit"),
    ],
};

pub const BOOKSTORE_MENU: Menu<BookstoreAction> = Menu {
    title: "BOOKSTORE",
    entries: &[
        (BookstoreAction::CreateData, "Create sample data"),
        (
            BookstoreAction::BooksWithPublisherAndAuthor,
            "Show books with publisher and author",
        ),
        (BookstoreAction::AuthorsWithBooks, "Show authors with their books"),
        (
            BookstoreAction::BookstoresWithBooks,
            "Show bookstores with their books",
        ),
        (
            BookstoreAction::BooksWithBookstores,
            "Show books and their bookstores",
        ),
        (BookstoreAction::DeleteData, "Delete all data"),
        (BookstoreAction::Back, "Back to main menu"),
    ],
};

pub const COMPANY_MENU: Menu<CompanyAction> = Menu {
    title: "COMPANY",
    entries: &[
        (CompanyAction::CreateData, "Create sample data"),
        (CompanyAction::OneToOne, "Show one-to-one (employee - address)"),
        (
            CompanyAction::OneToMany,
            "Show one-to-many (department - employees)",
        ),
        (
            CompanyAction::ManyToMany,
            "Show many-to-many (employee - project)",
        ),
        (CompanyAction::DeleteData, "Delete all data"),
        (CompanyAction::Back, "Back to main menu"),
    ],
};
