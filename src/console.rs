use crate::domain;
use crate::domain::task::Task;
use crate::domain::task::driving_ports::{TaskError, TaskPort};
use crate::domain::user::driving_ports::UserPort;
use crate::domain::user::{CreateUser, User};
use crate::persistence;
use anyhow::Context;
use std::io;
use std::io::Write;

/// Tracks who is driving the console between menu round-trips
struct Session {
    current_user: User,
}

/// The actions available from the main menu
#[derive(PartialEq, Eq, Debug)]
enum MenuChoice {
    ViewTasks,
    AddTask,
    FinishTask,
    UnfinishTask,
    RemoveTask,
    SwitchUser,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<MenuChoice> {
        match input.trim() {
            "1" => Some(Self::ViewTasks),
            "2" => Some(Self::AddTask),
            "3" => Some(Self::FinishTask),
            "4" => Some(Self::UnfinishTask),
            "5" => Some(Self::RemoveTask),
            "6" => Some(Self::SwitchUser),
            "7" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Parses a 1-based selection from a printed list, rejecting anything outside
/// the displayed range
fn parse_selection(input: &str, highest_option: usize) -> Option<usize> {
    let selection: usize = input.trim().parse().ok()?;
    if selection >= 1 && selection <= highest_option {
        Some(selection)
    } else {
        None
    }
}

/// Prints a question and reads a trimmed line from standard input
fn prompt(question: &str) -> Result<String, anyhow::Error> {
    print!("{question}");
    io::stdout().flush().context("Flushing console prompt")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Reading console input")?;
    Ok(line.trim().to_owned())
}

fn print_menu(current_user: &User) {
    println!();
    println!("Hello, {}! What would you like to do?", current_user.name);
    println!("1 - View my tasks");
    println!("2 - Add a task");
    println!("3 - Finish a task");
    println!("4 - Unfinish a task");
    println!("5 - Remove a task");
    println!("6 - Switch user");
    println!("7 - Exit");
}

/// Runs the interactive console against the same domain services the HTTP API uses.
/// Returns once the user picks "Exit".
pub async fn run(mut ext_cxn: persistence::ExternalConnectivity) -> Result<(), anyhow::Error> {
    println!("Welcome to the task list console.");
    let mut session = Session {
        current_user: select_user(&mut ext_cxn).await?,
    };

    loop {
        print_menu(&session.current_user);
        let choice_input = prompt("> ")?;
        let Some(choice) = MenuChoice::parse(&choice_input) else {
            println!("Unrecognized option \"{choice_input}\", please pick 1-7.");
            continue;
        };

        match choice {
            MenuChoice::ViewTasks => view_tasks(&session, &mut ext_cxn).await?,
            MenuChoice::AddTask => add_task(&session, &mut ext_cxn).await?,
            MenuChoice::FinishTask => {
                change_task_state(&session, &mut ext_cxn, TaskStateChange::Finish).await?
            }
            MenuChoice::UnfinishTask => {
                change_task_state(&session, &mut ext_cxn, TaskStateChange::Unfinish).await?
            }
            MenuChoice::RemoveTask => remove_task(&session, &mut ext_cxn).await?,
            MenuChoice::SwitchUser => session.current_user = select_user(&mut ext_cxn).await?,
            MenuChoice::Exit => {
                println!("Goodbye!");
                return Ok(());
            }
        }
    }
}

/// Lists the known users and lets the person at the keyboard pick one or sign up
async fn select_user(
    ext_cxn: &mut persistence::ExternalConnectivity,
) -> Result<User, anyhow::Error> {
    let user_service = domain::user::UserService {};
    let user_reader = persistence::db_user_driven_ports::DbUserReader {};
    let user_writer = persistence::db_user_driven_ports::DbUserWriter {};

    loop {
        let mut users = user_service.get_users(&mut *ext_cxn, &user_reader).await?;
        let create_option = users.len() + 1;

        println!();
        println!("Who are you?");
        for (index, user) in users.iter().enumerate() {
            println!("{} - {}", index + 1, user.name);
        }
        println!("{create_option} - I'm new here");

        let input = prompt("> ")?;
        match parse_selection(&input, create_option) {
            Some(selection) if selection == create_option => {
                let name = prompt("What's your name? ")?;
                if name.is_empty() {
                    println!("A name is required.");
                    continue;
                }

                let created_user = user_service
                    .create_user(&CreateUser { name }, &mut *ext_cxn, &user_writer)
                    .await?;
                println!("Welcome, {}!", created_user.name);
                return Ok(created_user);
            }
            Some(selection) => return Ok(users.swap_remove(selection - 1)),
            None => println!("That wasn't one of the options."),
        }
    }
}

/// Prints a console-friendly message for task failures the user can recover from,
/// passing real infrastructure errors through
fn report_task_error(err: TaskError) -> Result<(), anyhow::Error> {
    match err {
        TaskError::UserDoesNotExist => {
            println!("Your user no longer exists.");
            Ok(())
        }
        TaskError::ListDoesNotExist => {
            println!("Your task list could not be found.");
            Ok(())
        }
        TaskError::TaskDoesNotExist => {
            println!("That task no longer exists.");
            Ok(())
        }
        TaskError::PortError(inner) => Err(inner),
    }
}

async fn current_tasks(
    session: &Session,
    ext_cxn: &mut persistence::ExternalConnectivity,
) -> Result<Option<Vec<Task>>, anyhow::Error> {
    let task_service = domain::task::TaskService {};
    let user_detector = persistence::db_user_driven_ports::DbUserDetector {};
    let list_reader = persistence::db_task_list_driven_ports::DbListReader {};

    let tasks_result = task_service
        .tasks_for_user(
            session.current_user.id,
            &mut *ext_cxn,
            &user_detector,
            &list_reader,
        )
        .await;
    match tasks_result {
        Ok(tasks) => Ok(Some(tasks)),
        Err(task_err) => {
            report_task_error(task_err)?;
            Ok(None)
        }
    }
}

fn print_tasks(tasks: &[Task]) {
    for (index, task) in tasks.iter().enumerate() {
        let state_marker = if task.finished { "x" } else { " " };
        println!("{} - [{state_marker}] {}", index + 1, task.description);
    }
}

async fn view_tasks(
    session: &Session,
    ext_cxn: &mut persistence::ExternalConnectivity,
) -> Result<(), anyhow::Error> {
    let Some(tasks) = current_tasks(session, ext_cxn).await? else {
        return Ok(());
    };

    if tasks.is_empty() {
        println!("You have no tasks yet.");
    } else {
        print_tasks(&tasks);
    }
    Ok(())
}

async fn add_task(
    session: &Session,
    ext_cxn: &mut persistence::ExternalConnectivity,
) -> Result<(), anyhow::Error> {
    let description = prompt("What do you need to do? ")?;
    if description.is_empty() {
        println!("A task needs a description.");
        return Ok(());
    }

    let task_service = domain::task::TaskService {};
    let user_detector = persistence::db_user_driven_ports::DbUserDetector {};
    let list_reader = persistence::db_task_list_driven_ports::DbListReader {};
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

    let create_result = task_service
        .create_task_for_user(
            session.current_user.id,
            &domain::task::NewTask { description },
            &mut *ext_cxn,
            &user_detector,
            &list_reader,
            &task_writer,
        )
        .await;
    match create_result {
        Ok(created_task) => {
            println!("Added \"{}\" to your list.", created_task.description);
            Ok(())
        }
        Err(task_err) => report_task_error(task_err),
    }
}

enum TaskStateChange {
    Finish,
    Unfinish,
}

/// Shared flow for finishing and unfinishing: show the list, pick a task, flip it
async fn change_task_state(
    session: &Session,
    ext_cxn: &mut persistence::ExternalConnectivity,
    change: TaskStateChange,
) -> Result<(), anyhow::Error> {
    let verb = match change {
        TaskStateChange::Finish => "finish",
        TaskStateChange::Unfinish => "unfinish",
    };
    let Some(picked_task) = pick_task(session, ext_cxn, verb).await? else {
        return Ok(());
    };

    let task_service = domain::task::TaskService {};
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

    let change_result = match change {
        TaskStateChange::Finish => {
            task_service
                .mark_finished(picked_task.id, &mut *ext_cxn, &task_reader, &task_writer)
                .await
        }
        TaskStateChange::Unfinish => {
            task_service
                .mark_unfinished(picked_task.id, &mut *ext_cxn, &task_reader, &task_writer)
                .await
        }
    };
    match change_result {
        Ok(changed_task) => {
            let state_description = if changed_task.finished {
                "finished"
            } else {
                "back on your plate"
            };
            println!("\"{}\" is {state_description}.", changed_task.description);
            Ok(())
        }
        Err(task_err) => report_task_error(task_err),
    }
}

async fn remove_task(
    session: &Session,
    ext_cxn: &mut persistence::ExternalConnectivity,
) -> Result<(), anyhow::Error> {
    let Some(picked_task) = pick_task(session, ext_cxn, "remove").await? else {
        return Ok(());
    };

    let task_service = domain::task::TaskService {};
    let task_reader = persistence::db_task_driven_ports::DbTaskReader {};
    let task_writer = persistence::db_task_driven_ports::DbTaskWriter {};

    let delete_result = task_service
        .delete_task(picked_task.id, &mut *ext_cxn, &task_reader, &task_writer)
        .await;
    match delete_result {
        Ok(()) => {
            println!("Removed \"{}\".", picked_task.description);
            Ok(())
        }
        Err(task_err) => report_task_error(task_err),
    }
}

/// Shows the user's tasks and asks which one an action should apply to.
/// Resolves to [None] when there is nothing to pick or the answer was invalid.
async fn pick_task(
    session: &Session,
    ext_cxn: &mut persistence::ExternalConnectivity,
    verb: &str,
) -> Result<Option<Task>, anyhow::Error> {
    let Some(mut tasks) = current_tasks(session, ext_cxn).await? else {
        return Ok(None);
    };
    if tasks.is_empty() {
        println!("You have no tasks yet.");
        return Ok(None);
    }

    print_tasks(&tasks);
    let input = prompt(&format!("Which task would you like to {verb}? "))?;
    let Some(selection) = parse_selection(&input, tasks.len()) else {
        println!("That wasn't one of the options.");
        return Ok(None);
    };

    Ok(Some(tasks.swap_remove(selection - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod menu_choice {
        use super::*;

        #[test]
        fn parses_every_menu_option() {
            assert_eq!(Some(MenuChoice::ViewTasks), MenuChoice::parse("1"));
            assert_eq!(Some(MenuChoice::AddTask), MenuChoice::parse("2"));
            assert_eq!(Some(MenuChoice::FinishTask), MenuChoice::parse("3"));
            assert_eq!(Some(MenuChoice::UnfinishTask), MenuChoice::parse("4"));
            assert_eq!(Some(MenuChoice::RemoveTask), MenuChoice::parse("5"));
            assert_eq!(Some(MenuChoice::SwitchUser), MenuChoice::parse("6"));
            assert_eq!(Some(MenuChoice::Exit), MenuChoice::parse("7"));
        }

        #[test]
        fn tolerates_surrounding_whitespace() {
            assert_eq!(Some(MenuChoice::Exit), MenuChoice::parse(" 7 \n"));
        }

        #[test]
        fn rejects_unknown_input() {
            assert_eq!(None, MenuChoice::parse("8"));
            assert_eq!(None, MenuChoice::parse("exit"));
            assert_eq!(None, MenuChoice::parse(""));
        }
    }

    mod parse_selection {
        use super::*;

        #[test]
        fn accepts_values_in_range() {
            assert_eq!(Some(1), parse_selection("1", 3));
            assert_eq!(Some(3), parse_selection("3", 3));
        }

        #[test]
        fn rejects_values_out_of_range() {
            assert_eq!(None, parse_selection("0", 3));
            assert_eq!(None, parse_selection("4", 3));
            assert_eq!(None, parse_selection("-1", 3));
            assert_eq!(None, parse_selection("banana", 3));
        }
    }
}
