/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Startup callbacks invoked once by the host when the application launches.

use crate::{log::LogSink, package::PackageManager};

/// What the host hands every startup callback.
pub struct HostContext<'a> {
    pub package_name: &'a str,
    pub package_manager: &'a dyn PackageManager,
    pub log: &'a dyn LogSink,
}

impl<'a> HostContext<'a> {
    pub fn new(
        package_name: &'a str,
        package_manager: &'a dyn PackageManager,
        log: &'a dyn LogSink,
    ) -> Self {
        Self {
            package_name,
            package_manager,
            log,
        }
    }
}

type StartupHook = Box<dyn for<'a> FnOnce(&HostContext<'a>)>;

/// Ordered set of callbacks run on launch.
#[derive(Default)]
pub struct StartupHooks {
    hooks: Vec<StartupHook>,
}

impl StartupHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, hook: F)
    where
        F: for<'a> FnOnce(&HostContext<'a>) + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every hook once, in registration order. Consumes the registry so
    /// a launch cannot happen twice. Returns the number of hooks run.
    pub fn launch(self, ctx: &HostContext<'_>) -> usize {
        let count = self.hooks.len();
        for hook in self.hooks {
            hook(ctx);
        }
        count
    }
}
