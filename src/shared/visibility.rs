/**
 * Task Visibility
 *
 * Narrows a set of tasks to the ones an identity is allowed to see.
 * MEMBERs see only tasks assigned to them; ADMINs and MANAGERs see every
 * task they were handed (the caller has already scoped the set to a
 * project or team the identity may read).
 *
 * The filter is stable: surviving tasks keep their input order.
 */
use crate::shared::access::Identity;
use crate::shared::model::{Role, Task};

/// True if `identity` may see `task` within an already authorized scope
pub fn is_visible(identity: &Identity, task: &Task) -> bool {
    match identity.role {
        Role::Admin | Role::Manager => true,
        Role::Member => task.assigned_to == Some(identity.user_id),
    }
}

/// Filter `tasks` down to those visible to `identity`, preserving order.
pub fn visible_tasks(identity: &Identity, tasks: Vec<Task>) -> Vec<Task> {
    match identity.role {
        Role::Admin | Role::Manager => tasks,
        Role::Member => tasks
            .into_iter()
            .filter(|task| is_visible(identity, task))
            .collect(),
    }
}
