use std::time::Duration;
use std::iter::Enumerate;

use indicatif::ProgressBar;
use indicatif::ProgressStyle;


pub(crate) trait ProgressObserver {

    // the parameters are passed as callbacks in case the progress implementation doesn't care (such as the () observer used in tests)
    fn start<Message: AsRef<str>, Callback: FnOnce() -> (Message,Option<usize>)>(&mut self, callback: Callback);

    fn start_unknown_endpoint<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, callback: Callback);

    fn update<Callback: FnOnce() -> usize>(&self, callback: Callback);

    fn message<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, callback: Callback);

    fn warning<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, callback: Callback);

    fn finish<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, callback: Callback);

}


// This one allows for not observing when you don't need it.
impl ProgressObserver for () {

    fn start<Message: AsRef<str>, Callback: FnOnce() -> (Message,Option<usize>)>(&mut self, _: Callback) {
    }

    fn start_unknown_endpoint<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, _: Callback) {
    }

    fn update<Callback: FnOnce() -> usize>(&self, _: Callback) {
    }

    fn message<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, _: Callback) {
    }

    fn warning<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, _: Callback){

    }

    fn finish<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, _: Callback) {
    }
}


/// Draws progress to stderr, so the JSON responses written to stdout stay clean.
pub(crate) struct ConsoleProgressBar {

    bar: Option<ProgressBar>

}

impl ConsoleProgressBar {

    pub(crate) const fn new() -> Self {
        Self {
            bar: None
        }
    }

    fn style(template: &str) -> ProgressStyle {
        // the templates are constant, but if one is ever broken it's better to draw a plain bar than fail the command.
        ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn style_as_spinner(bar: &mut ProgressBar) {
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(Self::style("({elapsed_precise}) {msg} {spinner}"));
    }

    fn style_as_progress(bar: &mut ProgressBar) {
        bar.disable_steady_tick();
        bar.set_style(Self::style("({elapsed_precise}) [{bar:40}] {msg} {spinner}").progress_chars("=> "));
    }

    fn style_as_finished(bar: &mut ProgressBar) {
        bar.set_style(Self::style("({elapsed_precise}) {msg}"));
    }

    fn start_bar<Message: AsRef<str>>(&mut self, message: Message, step_count: Option<usize>) {
        if let Some(bar) = &mut self.bar {
            bar.reset();
            if let Some(step_count) = step_count {
                bar.set_length(step_count as u64);
                Self::style_as_progress(bar)
            } else {
                Self::style_as_spinner(bar);
            }
            bar.set_message(message.as_ref().to_owned());
        } else {
            let bar = if let Some(step_count) = step_count {
                let mut bar = ProgressBar::new(step_count as u64);
                Self::style_as_progress(&mut bar);
                bar
            } else {
                let mut bar = ProgressBar::new_spinner();
                Self::style_as_spinner(&mut bar);
                bar
            };
            bar.set_message(message.as_ref().to_owned());
            self.bar = Some(bar);
        }

    }

}

impl ProgressObserver for ConsoleProgressBar {

    fn start<Message: AsRef<str>, Callback: FnOnce() -> (Message,Option<usize>)>(&mut self, callback: Callback) {
        let (message,step_count) = callback();
        self.start_bar(message, step_count)
    }

    fn start_unknown_endpoint<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, callback: Callback) {
        self.start_bar(callback(), None)
    }

    fn update<Callback: FnOnce() -> usize>(&self, callback: Callback) {
        if let Some(bar) = &self.bar {
            bar.set_position(callback() as u64);
        }
    }

    fn message<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, callback: Callback) {
        if let Some(bar) = &self.bar {
            bar.set_message(callback().as_ref().to_owned())
        }
    }

    fn warning<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, callback: Callback){
        // FUTURE: Make this in another color?
        if let Some(bar) = &self.bar {
            bar.suspend(|| eprintln!("{}",callback().as_ref()))
        } else {
            eprintln!("{}",callback().as_ref())
        }
    }

    fn finish<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, callback: Callback) {
        if let Some(bar) = &mut self.bar {
            Self::style_as_finished(bar);
            bar.finish_with_message(callback().as_ref().to_owned());
            self.bar = None;
        }
    }

}

pub(crate) struct IteratorWatcher<'progress,Message: AsRef<str>, Progress: ProgressObserver, IteratorType> {
    finish: Message,
    progress: &'progress mut Progress,
    inner: Enumerate<IteratorType>
}

impl<Message: AsRef<str>, Progress: ProgressObserver, ItemType, IteratorType: Iterator<Item=ItemType>> Iterator for IteratorWatcher<'_,Message,Progress,IteratorType> {

    type Item = ItemType;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((i,next)) = self.inner.next() {
            self.progress.update(|| i);
            Some(next)
        } else {
            self.progress.finish(|| &self.finish);
            None
        }

    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }


}

pub(crate) trait WatchableIterator: Iterator + Sized {

    fn watch<StartMessage: AsRef<str>, FinishMessage: AsRef<str>, Progress: ProgressObserver>(self, progress: &mut Progress, start: StartMessage, finish: FinishMessage) -> IteratorWatcher<'_, FinishMessage, Progress, Self>;
}

impl<IteratorType: Iterator> WatchableIterator for IteratorType {

    fn watch<StartMessage: AsRef<str>, FinishMessage: AsRef<str>, Progress: ProgressObserver>(self, progress: &mut Progress, start: StartMessage, finish: FinishMessage) -> IteratorWatcher<'_, FinishMessage, Progress, Self> {
        progress.start(|| (start,self.size_hint().1));
        IteratorWatcher {
            finish,
            progress,
            inner: self.enumerate()
        }

    }


}

#[cfg(test)]
mod test {

    use std::cell::RefCell;

    use super::ProgressObserver;
    use super::WatchableIterator;

    #[derive(Default)]
    struct RecordingObserver {
        events: RefCell<Vec<String>>
    }

    impl ProgressObserver for RecordingObserver {

        fn start<Message: AsRef<str>, Callback: FnOnce() -> (Message,Option<usize>)>(&mut self, callback: Callback) {
            let (message,count) = callback();
            self.events.borrow_mut().push(format!("start {} {:?}",message.as_ref(),count));
        }

        fn start_unknown_endpoint<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, callback: Callback) {
            self.events.borrow_mut().push(format!("start {}",callback().as_ref()));
        }

        fn update<Callback: FnOnce() -> usize>(&self, callback: Callback) {
            self.events.borrow_mut().push(format!("update {}",callback()));
        }

        fn message<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, callback: Callback) {
            self.events.borrow_mut().push(format!("message {}",callback().as_ref()));
        }

        fn warning<Message: AsRef<str>, Callback: FnOnce() -> Message>(&self, callback: Callback) {
            self.events.borrow_mut().push(format!("warning {}",callback().as_ref()));
        }

        fn finish<Message: AsRef<str>, Callback: FnOnce() -> Message>(&mut self, callback: Callback) {
            self.events.borrow_mut().push(format!("finish {}",callback().as_ref()));
        }
    }

    #[test]
    fn watch_reports_each_item_then_finishes() {
        let mut observer = RecordingObserver::default();
        let items: Vec<_> = vec!['a','b'].into_iter().watch(&mut observer,"Reading letters.","Letters read.").collect();
        assert_eq!(items,vec!['a','b']);
        assert_eq!(observer.events.into_inner(),vec![
            "start Reading letters. Some(2)".to_owned(),
            "update 0".to_owned(),
            "update 1".to_owned(),
            "finish Letters read.".to_owned()
        ])
    }

    #[test]
    fn unit_observer_ignores_everything() {
        let mut observer = ();
        let count = (0..5).watch(&mut observer,"Counting.","Counted.").count();
        assert_eq!(count,5);
        observer.warning(|| "nothing to see");
    }
}
