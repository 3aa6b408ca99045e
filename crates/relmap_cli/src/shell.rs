//! Interactive menu loop.
//!
//! Every selected action opens its own session. Action failures are logged,
//! printed and the menu is shown again; only terminal I/O errors end the loop.

use crate::menu::{
    BookstoreAction, CompanyAction, MainAction, MenuChoice, BOOKSTORE_MENU, COMPANY_MENU,
    MAIN_MENU,
};
use log::{error, info};
use relmap_core::{BookstoreService, CompanyService, ServiceResult, SessionFactory};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub fn run<R: BufRead>(factory: &SessionFactory, input: &mut R) -> io::Result<()> {
    loop {
        let Some(choice) = prompt(MAIN_MENU.render(), input)? else {
            return Ok(());
        };
        let flow = match MAIN_MENU.select(choice) {
            Some(MainAction::Bookstore) => bookstore_menu(factory, input)?,
            Some(MainAction::Company) => company_menu(factory, input)?,
            Some(MainAction::Exit) => {
                println!("Goodbye!");
                Flow::Quit
            }
            None => {
                println!("Error: invalid option");
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            return Ok(());
        }
    }
}

fn bookstore_menu<R: BufRead>(factory: &SessionFactory, input: &mut R) -> io::Result<Flow> {
    loop {
        let Some(choice) = prompt(BOOKSTORE_MENU.render(), input)? else {
            return Ok(Flow::Quit);
        };
        let Some(action) = BOOKSTORE_MENU.select(choice) else {
            println!("Error: invalid option");
            continue;
        };
        if action == BookstoreAction::Back {
            println!("Returning to main menu...");
            return Ok(Flow::Continue);
        }

        perform(factory, action_name(action), |conn| {
            let service = BookstoreService::new(conn);
            let output = match action {
                BookstoreAction::CreateData => service.create_sample_data()?.to_string(),
                BookstoreAction::BooksWithPublisherAndAuthor => {
                    service.books_with_publisher_and_author()?.to_string()
                }
                BookstoreAction::AuthorsWithBooks => service.authors_with_books()?.to_string(),
                BookstoreAction::BookstoresWithBooks => {
                    service.bookstores_with_books()?.to_string()
                }
                BookstoreAction::BooksWithBookstores => {
                    service.books_with_bookstores()?.to_string()
                }
                BookstoreAction::DeleteData => service.delete_all_data()?.to_string(),
                BookstoreAction::Back => String::new(),
            };
            Ok(output)
        });
    }
}

fn company_menu<R: BufRead>(factory: &SessionFactory, input: &mut R) -> io::Result<Flow> {
    loop {
        let Some(choice) = prompt(COMPANY_MENU.render(), input)? else {
            return Ok(Flow::Quit);
        };
        let Some(action) = COMPANY_MENU.select(choice) else {
            println!("Error: invalid option");
            continue;
        };
        if action == CompanyAction::Back {
            println!("Returning to main menu...");
            return Ok(Flow::Continue);
        }

        perform(factory, company_action_name(action), |conn| {
            let service = CompanyService::new(conn);
            let output = match action {
                CompanyAction::CreateData => service.create_sample_data()?.to_string(),
                CompanyAction::OneToOne => service.one_to_one()?.to_string(),
                CompanyAction::OneToMany => service.one_to_many()?.to_string(),
                CompanyAction::ManyToMany => service.many_to_many()?.to_string(),
                CompanyAction::DeleteData => service.delete_all_data()?.to_string(),
                CompanyAction::Back => String::new(),
            };
            Ok(output)
        });
    }
}

/// Runs one user action in a fresh session and reports the outcome.
fn perform<F>(factory: &SessionFactory, action: &'static str, work: F)
where
    F: FnOnce(&Connection) -> ServiceResult<String>,
{
    let session = match factory.open_session() {
        Ok(session) => session,
        Err(err) => {
            error!("event=action module=cli status=error action={action} error={err}");
            println!("Database error: {err}");
            return;
        }
    };

    match work(session.connection()) {
        Ok(output) => {
            info!("event=action module=cli status=ok action={action}");
            println!("{output}");
        }
        Err(err) => {
            error!("event=action module=cli status=error action={action} error={err}");
            println!("Error while running `{action}`: {err}");
        }
    }

    if let Err(err) = session.close() {
        error!("event=session_close module=cli status=error error={err}");
    }
}

/// Prints `menu` and reads one line. `None` means end of input.
fn prompt<R: BufRead>(menu: String, input: &mut R) -> io::Result<Option<MenuChoice>> {
    print!("{menu}");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(MenuChoice::parse(&line)))
}

fn action_name(action: BookstoreAction) -> &'static str {
    match action {
        BookstoreAction::CreateData => "bookstore.create_data",
        BookstoreAction::BooksWithPublisherAndAuthor => "bookstore.books_with_publisher_and_author",
        BookstoreAction::AuthorsWithBooks => "bookstore.authors_with_books",
        BookstoreAction::BookstoresWithBooks => "bookstore.bookstores_with_books",
        BookstoreAction::BooksWithBookstores => "bookstore.books_with_bookstores",
        BookstoreAction::DeleteData => "bookstore.delete_data",
        BookstoreAction::Back => "bookstore.back",
    }
}

fn company_action_name(action: CompanyAction) -> &'static str {
    match action {
        CompanyAction::CreateData => "company.create_data",
        CompanyAction::OneToOne => "company.one_to_one",
        CompanyAction::OneToMany => "company.one_to_many",
        CompanyAction::ManyToMany => "company.many_to_many",
        CompanyAction::DeleteData => "company.delete_data",
        CompanyAction::Back => "company.back",
    }
}

#[cfg(test)]
mod tests {
    use super::run;
    use relmap_core::{DatabaseConfig, SessionFactory};
    use std::io::Cursor;

    #[test]
    fn scripted_session_seeds_reports_and_exits() {
        let factory = SessionFactory::build(&DatabaseConfig::in_memory()).unwrap();
        let mut input = Cursor::new("1\n1\n3\nabc\n7\n2\n1\n4\n6\n9\n3\n");

        run(&factory, &mut input).unwrap();

        let session = factory.open_session().unwrap();
        let authors: i64 = session
            .query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))
            .unwrap();
        let assignments: i64 = session
            .query_row("SELECT COUNT(*) FROM employee_projects;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(authors, 3);
        assert_eq!(assignments, 6);
    }

    #[test]
    fn end_of_input_inside_submenu_ends_the_loop() {
        let factory = SessionFactory::build(&DatabaseConfig::in_memory()).unwrap();
        let mut input = Cursor::new("2\n");
        run(&factory, &mut input).unwrap();
    }
}
